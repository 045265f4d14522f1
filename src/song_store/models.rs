use serde::{Deserialize, Serialize};

/// A persisted song row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    pub group_name: String,
    pub song_name: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Song fields supplied by callers; the id is assigned by the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewSong {
    pub group_name: String,
    pub song_name: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}
