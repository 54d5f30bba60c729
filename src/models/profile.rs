use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub avatar: String, // 头像字符或表情
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(min = 1, max = 16))]
    pub avatar: String,

    #[validate(length(min = 1, max = 32))]
    pub color: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 16))]
    pub avatar: Option<String>,

    #[validate(length(min = 1, max = 32))]
    pub color: Option<String>,
}

impl Profile {
    pub fn apply(&mut self, request: UpdateProfileRequest) {
        if let Some(name) = request.name {
            self.name = name;
        }
        if let Some(avatar) = request.avatar {
            self.avatar = avatar;
        }
        if let Some(color) = request.color {
            self.color = color;
        }
        self.updated_at = Utc::now();
    }
}
