pub mod branch;
pub mod branch_name;

pub const DEFAULT_BRANCH: &str = "master";
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\.\.|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f/]";
/// Separator joining a remote name and a branch name into a fetched branch name
pub const REMOTE_BRANCH_SEPARATOR: char = '-';
