//! 位置层级：楼宇 → 楼层 → 房间。
//!
//! 房间列表中每个房间都内嵌所属楼层与楼宇，层级由房间列表反推。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub building: Building,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub room_number: Option<i32>,
    pub floor: Floor,
}
