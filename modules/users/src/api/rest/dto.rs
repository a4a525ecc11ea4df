use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{NewUser, User, UserUpdate};

/// XML root of a single user.
pub const USER_XML_ROOT: &str = "user";
/// XML root of a user list; each entry is a `<user>` element.
pub const USERS_XML_ROOT: &str = "users";
/// XML root of a bare identity (POST / PUT created responses).
pub const GUID_XML_ROOT: &str = "guid";

/// REST DTO for user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub games_played: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_game_id: Option<Uuid>,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserReq {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// REST DTO for replacing a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserReq {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Raw page query; values are clamped by the service, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersQuery {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
}

impl ListUsersQuery {
    /// Pick the paging keys out of a raw query string.
    ///
    /// Keys match case-insensitively and the first occurrence of a repeated
    /// key wins. Unknown keys and malformed pairs are ignored.
    pub fn from_raw(query: Option<&str>) -> Self {
        let mut out = Self::default();
        let Some(query) = query else {
            return out;
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = if key.eq_ignore_ascii_case("pageNumber") {
                &mut out.page_number
            } else if key.eq_ignore_ascii_case("pageSize") {
                &mut out.page_size
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        out
    }
}

/// XML shape of a user list.
#[derive(Debug, Serialize)]
pub struct UserListXml<'a> {
    #[serde(rename = "user")]
    pub users: &'a [UserDto],
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        let full_name = format!("{} {}", user.last_name, user.first_name)
            .trim()
            .to_owned();
        Self {
            id: user.id,
            login: user.login,
            first_name: user.first_name,
            last_name: user.last_name,
            full_name,
            games_played: user.games_played,
            current_game_id: user.current_game_id,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            login: req.login.unwrap_or_default(),
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
        }
    }
}

impl From<UpdateUserReq> for UserUpdate {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            login: req.login,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}
