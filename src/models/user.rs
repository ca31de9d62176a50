use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_AVATAR_SIZE: &str = "48x48";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraUser {
    pub key: String,
    pub name: String,
    pub email_address: String,
    pub avatar_url: Option<String>,
    pub display_name: String,
}

/// REST APIが返すユーザー
#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraUser {
    pub key: String,
    pub name: String,
    #[serde(rename = "emailAddress", default)]
    pub email_address: String,
    #[serde(rename = "avatarUrls")]
    pub avatar_urls: Option<HashMap<String, String>>,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl HttpJiraUser {
    pub fn into_jira_user(self) -> JiraUser {
        let avatar_url = self
            .avatar_urls
            .and_then(|mut urls| urls.remove(DEFAULT_AVATAR_SIZE));
        JiraUser {
            key: self.key,
            name: self.name,
            email_address: self.email_address,
            avatar_url,
            display_name: self.display_name,
        }
    }
}

/// プロジェクトロール
#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraRole {
    pub id: serde_json::Value,
    pub name: String,
    #[serde(default)]
    pub actors: Vec<HttpJiraRoleActor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpJiraRoleActor {
    pub id: serde_json::Value,
    pub name: String,
    #[serde(rename = "type")]
    pub actor_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_conversion_picks_default_avatar() {
        // Given: 複数サイズのアバターを持つユーザー
        let json_data = json!({
            "key": "JIRAUSER10000",
            "name": "admin",
            "emailAddress": "admin@example.com",
            "displayName": "Administrator",
            "avatarUrls": {
                "48x48": "https://jira.example.com/avatar/48.png",
                "16x16": "https://jira.example.com/avatar/16.png"
            },
            "active": true
        });

        // When: ドメインモデルに変換
        let user: HttpJiraUser = serde_json::from_value(json_data).unwrap();
        let user = user.into_jira_user();

        // Then: 48x48のアバターが使われる
        assert_eq!(user.name, "admin");
        assert_eq!(
            user.avatar_url.as_deref(),
            Some("https://jira.example.com/avatar/48.png")
        );
    }

    #[test]
    fn test_user_without_avatars() {
        let user: HttpJiraUser = serde_json::from_value(json!({
            "key": "k",
            "name": "n",
            "displayName": "N"
        }))
        .unwrap();

        let user = user.into_jira_user();

        assert!(user.avatar_url.is_none());
        assert_eq!(user.email_address, "");
    }

    #[test]
    fn test_role_deserialization() {
        let role: HttpJiraRole = serde_json::from_value(json!({
            "id": 10002,
            "name": "Administrators",
            "actors": [
                {"id": 10100, "name": "jira-administrators", "type": "atlassian-group-role-actor"}
            ]
        }))
        .unwrap();

        assert_eq!(role.actors.len(), 1);
        assert_eq!(role.actors[0].actor_type, "atlassian-group-role-actor");
    }
}
