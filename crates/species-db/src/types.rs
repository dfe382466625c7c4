use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A species row as stored and as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    pub id: String,
    pub name: String,
    pub info: String,
    pub created_at: DateTime<Utc>,
    /// Reserved; never incremented
    #[sqlx(rename = "count")]
    pub access_count: i64,
}

/// One entry of a seed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSpecies {
    pub id: String,
    pub name: String,
    /// Missing or `null` in the file both mean empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub info: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_species_info_defaults_to_empty() {
        let seed: SeedSpecies = serde_json::from_str(r#"{"id":"7","name":"Species-7"}"#).unwrap();
        assert_eq!(seed.id, "7");
        assert_eq!(seed.name, "Species-7");
        assert_eq!(seed.info, "");
    }

    #[test]
    fn test_seed_species_null_info_is_empty() {
        let seed: SeedSpecies =
            serde_json::from_str(r#"{"id":"1","name":"Species-1","info":null}"#).unwrap();
        assert_eq!(seed.info, "");
    }

    #[test]
    fn test_species_record_uses_camel_case() {
        let record = SpeciesRecord {
            id: "1".to_string(),
            name: "Species-1".to_string(),
            info: "x".to_string(),
            created_at: Utc::now(),
            access_count: 0,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Species-1");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["accessCount"], 0);
    }
}
