use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::room::Role;

fn default_host_name() -> String {
    "Host".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Display name of the host. Clients that send an empty body get the
    /// default.
    #[serde(default = "default_host_name")]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub user_id: Uuid,
    pub user_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: Uuid,
    pub room_code: String,
    /// Join deep-link, rendered as a QR image on the client.
    pub qr_code: String,
    pub host: HostInfo,
    pub ws: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_code: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub user_id: Uuid,
    pub username: String,
    pub room_id: Uuid,
    pub room_code: String,
    pub role: Role,
    pub ws: String,
}
