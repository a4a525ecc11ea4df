use modkit::api::Patchable;
use serde_json::Value;
use uuid::Uuid;

/// Pure domain model (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    /// Server-managed; no payload writes it.
    pub games_played: u32,
    /// Server-managed; no payload writes it.
    pub current_game_id: Option<Uuid>,
}

/// Data for creating a new user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// Materialise the entity with fresh game statistics.
    pub fn into_user(self, id: Uuid) -> User {
        User {
            id,
            login: self.login,
            first_name: self.first_name,
            last_name: self.last_name,
            games_played: 0,
            current_game_id: None,
        }
    }
}

/// Full replaceable field set, used by PUT and as the PATCH target.
///
/// `None` means the field was not supplied (or was removed by a patch).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserUpdate {
    /// Overwrite the replaceable fields of `user`; identity and game stats are kept.
    pub fn apply_to(self, user: &mut User) {
        user.login = self.login.unwrap_or_default();
        user.first_name = self.first_name.unwrap_or_default();
        user.last_name = self.last_name.unwrap_or_default();
    }

    pub fn into_new_user(self) -> NewUser {
        NewUser {
            login: self.login.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        }
    }
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            login: Some(user.login.clone()),
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserUpdateField {
    Login,
    FirstName,
    LastName,
}

impl UserUpdate {
    fn slot(&mut self, field: UserUpdateField) -> &mut Option<String> {
        match field {
            UserUpdateField::Login => &mut self.login,
            UserUpdateField::FirstName => &mut self.first_name,
            UserUpdateField::LastName => &mut self.last_name,
        }
    }
}

impl Patchable for UserUpdate {
    type Field = UserUpdateField;

    fn field(name: &str) -> Option<UserUpdateField> {
        match name.to_ascii_lowercase().as_str() {
            "login" => Some(UserUpdateField::Login),
            "firstname" => Some(UserUpdateField::FirstName),
            "lastname" => Some(UserUpdateField::LastName),
            _ => None,
        }
    }

    fn get(&self, field: UserUpdateField) -> Option<Value> {
        let value = match field {
            UserUpdateField::Login => &self.login,
            UserUpdateField::FirstName => &self.first_name,
            UserUpdateField::LastName => &self.last_name,
        };
        value.clone().map(Value::String)
    }

    fn set(&mut self, field: UserUpdateField, value: Value) -> Result<(), String> {
        let slot = self.slot(field);
        match value {
            Value::String(s) => {
                *slot = Some(s);
                Ok(())
            }
            Value::Null => {
                *slot = None;
                Ok(())
            }
            other => Err(format!("The value '{other}' is not a valid string.")),
        }
    }

    fn clear(&mut self, field: UserUpdateField) {
        *self.slot(field) = None;
    }
}
