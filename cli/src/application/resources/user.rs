use crate::application::ports::Backend;
use crate::domain::error::BackendError;
use crate::domain::snapshot::user::{
    group_command, groups_command, parse_group, parse_groups, parse_passwd, passwd_command,
};
use crate::domain::snapshot::{GroupSnapshot, UserSnapshot};

/// A user account.
pub struct User<'a, B> {
    backend: &'a B,
    name: String,
}

impl<'a, B: Backend> User<'a, B> {
    pub(super) fn new(backend: &'a B, name: String) -> Self {
        Self { backend, name }
    }

    /// Account details and group membership. Absent users have `exists = false`.
    ///
    /// # Errors
    ///
    /// `Protocol` for malformed database entries; transport faults pass through.
    pub async fn snapshot(&self) -> Result<UserSnapshot, BackendError> {
        let passwd = self.backend.execute(&passwd_command(&self.name)).await?;
        let Some(mut user) = parse_passwd(&self.name, &passwd)? else {
            return Ok(UserSnapshot::absent(&self.name));
        };
        let groups = self.backend.execute(&groups_command(&self.name)).await?;
        user.groups = parse_groups(&self.name, &groups)?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Same as [`User::snapshot`].
    pub async fn exists(&self) -> Result<bool, BackendError> {
        let passwd = self.backend.execute(&passwd_command(&self.name)).await?;
        Ok(parse_passwd(&self.name, &passwd)?.is_some())
    }
}

/// A group.
pub struct Group<'a, B> {
    backend: &'a B,
    name: String,
}

impl<'a, B: Backend> Group<'a, B> {
    pub(super) fn new(backend: &'a B, name: String) -> Self {
        Self { backend, name }
    }

    /// # Errors
    ///
    /// `Protocol` for malformed database entries; transport faults pass through.
    pub async fn snapshot(&self) -> Result<GroupSnapshot, BackendError> {
        let output = self.backend.execute(&group_command(&self.name)).await?;
        parse_group(&self.name, &output)
    }
}
