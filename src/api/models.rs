use serde::Deserialize;

use crate::search::SearchFilterInput;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub search_type: String,

    #[serde(flatten)]
    pub filters: SearchFilterInput,
}
