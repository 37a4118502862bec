use yawt_domain::Name;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

pub const MAX_USERS: usize = 4;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub users: Vec<String>,
    pub active_user: String,
    /// The spreadsheet sets and exercises are stored in.
    #[serde(default)]
    pub sheet_id: Option<String>,
}

impl Settings {
    pub fn add_user(&mut self, name: Name) -> Result<(), SettingsError> {
        let name = String::from(name);
        if self.users.contains(&name) {
            return Err(SettingsError::Duplicate(name));
        }
        if self.users.len() >= MAX_USERS {
            return Err(SettingsError::TooManyUsers);
        }
        self.users.push(name);
        Ok(())
    }

    /// Remove a user. If it was the active user, the first remaining user becomes active.
    pub fn remove_user(&mut self, name: &str) -> Result<(), SettingsError> {
        let Some(index) = self.users.iter().position(|u| u == name) else {
            return Err(SettingsError::UnknownUser(name.to_string()));
        };
        if self.users.len() <= 1 {
            return Err(SettingsError::LastUser);
        }
        self.users.remove(index);
        if self.active_user == name {
            self.active_user.clone_from(&self.users[0]);
        }
        Ok(())
    }

    pub fn select_user(&mut self, name: &str) -> Result<(), SettingsError> {
        if !self.users.iter().any(|u| u == name) {
            return Err(SettingsError::UnknownUser(name.to_string()));
        }
        name.clone_into(&mut self.active_user);
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            users: vec!["Ethan".to_string(), "Ava".to_string()],
            active_user: "Ethan".to_string(),
            sheet_id: None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("User {0} already exists")]
    Duplicate(String),
    #[error("At most four users are supported")]
    TooManyUsers,
    #[error("The last user cannot be removed")]
    LastUser,
    #[error("Unknown user {0}")]
    UnknownUser(String),
}
