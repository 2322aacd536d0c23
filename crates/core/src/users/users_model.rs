//! User domain models.

use serde::{Deserialize, Serialize};

/// A marketplace member acting as buyer and/or seller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl User {
    /// Contact line shared with the counterpart of a confirmed order.
    pub fn contact_line(&self) -> String {
        match &self.phone {
            Some(phone) => format!("{} <{}>, phone {}", self.name, self.email, phone),
            None => format!("{} <{}>", self.name, self.email),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
