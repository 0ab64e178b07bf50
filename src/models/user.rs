use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::{invalid_column, parse_uuid};
use crate::store::sqlite::queries::get_by_id;
use crate::store::{write_error, Resource, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Guide => "guide",
            Self::LeadGuide => "lead-guide",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "guide" => Ok(Self::Guide),
            "lead-guide" => Ok(Self::LeadGuide),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// An account. Credentials and authentication are handled elsewhere; no
/// password material lives in this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Update payload; absent fields keep their current value. `photo` can be
/// replaced but not cleared back to null through a patch.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

fn validate(name: &str, email: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation(
            "Please tell us your name".to_string(),
        ));
    }
    let at = email.find('@');
    let valid = matches!(at, Some(pos) if pos > 0 && pos < email.len() - 1);
    if !valid {
        return Err(StoreError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }
    Ok(())
}

impl Resource for User {
    const TABLE: &'static str = "users";
    const RESOURCE: &'static str = "user";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "photo",
        "role",
        "active",
        "created_at",
    ];
    const BOOL_COLUMNS: &'static [&'static str] = &["active"];

    type Draft = UserDraft;
    type Patch = UserPatch;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let role: String = row.get("role")?;
        Ok(Self {
            id: parse_uuid(row.get("id")?)?,
            name: row.get("name")?,
            email: row.get("email")?,
            photo: row.get("photo")?,
            role: role.parse().map_err(invalid_column)?,
            active: row.get("active")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(conn: &Connection, id: Uuid, draft: &UserDraft) -> Result<(), StoreError> {
        validate(&draft.name, &draft.email)?;
        conn.execute(
            "INSERT INTO users (id, name, email, photo, role, active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                id.to_string(),
                draft.name,
                draft.email,
                draft.photo,
                draft.role.unwrap_or(Role::User).as_str(),
                Utc::now(),
            ],
        )
        .map_err(write_error)?;
        Ok(())
    }

    fn update(conn: &Connection, id: Uuid, patch: &UserPatch) -> Result<usize, StoreError> {
        let Some(current) = get_by_id::<User>(conn, id)? else {
            return Ok(0);
        };

        let name = patch.name.clone().unwrap_or(current.name);
        let email = patch.email.clone().unwrap_or(current.email);
        validate(&name, &email)?;

        let matched = conn
            .execute(
                "UPDATE users SET name = ?1, email = ?2, photo = ?3, role = ?4, active = ?5, \
                 version = version + 1 WHERE id = ?6",
                params![
                    name,
                    email,
                    patch.photo.clone().or(current.photo),
                    patch.role.unwrap_or(current.role).as_str(),
                    patch.active.unwrap_or(current.active),
                    id.to_string(),
                ],
            )
            .map_err(write_error)?;
        Ok(matched)
    }
}
