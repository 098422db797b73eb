use crate::artifacts::branch::{INVALID_BRANCH_NAME_REGEX, REMOTE_BRANCH_SEPARATOR};
use crate::errors::RepositoryError;
use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(RepositoryError::InvalidOperand("branch name cannot be empty".into()).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(RepositoryError::InvalidOperand(format!("invalid branch name: {name}")).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Parse a branch operand, accepting the `remote/branch` spelling
    ///
    /// `origin/master` names the branch fetched from `origin`, stored locally
    /// as `origin-master`.
    pub fn try_parse_operand(operand: &str) -> anyhow::Result<Self> {
        match operand.split_once('/') {
            Some((remote, branch)) => Self::fetched(remote, branch),
            None => Self::try_parse(operand.to_string()),
        }
    }

    /// Local name of `branch` once it has been fetched from `remote`
    pub fn fetched(remote: &str, branch: &str) -> anyhow::Result<Self> {
        Self::try_parse(format!("{remote}{REMOTE_BRANCH_SEPARATOR}{branch}"))
    }

    /// The `remote/branch` spelling of a fetched branch
    ///
    /// `None` when no remote in `remotes` could have produced this name. The
    /// longest matching remote name wins.
    pub fn remote_spelling<'r>(&self, remotes: impl IntoIterator<Item = &'r str>) -> Option<String> {
        remotes
            .into_iter()
            .filter_map(|remote| {
                let branch = self
                    .0
                    .strip_prefix(remote)?
                    .strip_prefix(REMOTE_BRANCH_SEPARATOR)?;
                (!branch.is_empty()).then_some((remote, branch))
            })
            .max_by_key(|(remote, _)| remote.len())
            .map(|(remote, branch)| format!("{remote}/{branch}"))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
