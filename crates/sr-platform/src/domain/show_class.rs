//! Show Class Entity
//!
//! A judged category within a division. The optional categorisation enums
//! follow common model horse show standards and restrict which horses a
//! class is meant for.

use chrono::{DateTime, Utc};
use sr_common::ShowClassRequest;

use super::parse_optional;
use crate::error::{PlatformError, Result};

named_enum! {
    pub enum BreedCategory {
        /// Thoroughbred, Warmbloods, Standardbred, Akhal-Teke
        SportBreeds,
        /// Arabian, Morgan, Saddlebred, Tennessee Walking Horse
        LightBreeds,
        /// Clydesdale, Percheron, Shire, Belgian
        DraftBreeds,
        /// Welsh, Shetland, Connemara, POA, Hackney
        PonyBreeds,
        /// Quarter Horse, Paint, Appaloosa, Mustang
        StockBreeds,
        OtherBreeds,
    }
}

named_enum! {
    pub enum FinishType {
        OriginalFinish,
        Custom,
        ArtistResin,
    }
}

named_enum! {
    pub enum PerformanceType {
        Hunter,
        Jumper,
        Dressage,
        EnglishPleasure,
        EnglishTrail,
        Reining,
        WesternPleasure,
        BarrelRacing,
        WesternTrail,
        Costume,
        Parade,
        Harness,
        Scene,
        Setup,
    }
}

named_enum! {
    pub enum CollectibilityType {
        BreyerModels,
        StoneModels,
        HagenRenaker,
        VintageModels,
        LimitedEdition,
        TestColors,
        OtherCollectible,
    }
}

named_enum! {
    pub enum Gender {
        Stallion,
        Mare,
        Gelding,
        Foal,
    }
}

named_enum! {
    pub enum AgeCategory {
        Foal,
        Yearling,
        Adult,
        Any,
    }
}

named_enum! {
    pub enum ColorRestriction {
        Bay,
        Chestnut,
        Black,
        Gray,
        Palomino,
        Buckskin,
        Pinto,
        Appaloosa,
        Any,
    }
}

named_enum! {
    pub enum ScaleCategory {
        /// 1:9
        Traditional,
        /// 1:12
        Classic,
        /// 1:32
        Stablemate,
        Micro,
        Any,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowClass {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub class_number: i32,
    /// None means unlimited
    pub max_entries: Option<i32>,
    pub sort_order: i32,
    pub breed_category: Option<BreedCategory>,
    pub finish_type: Option<FinishType>,
    pub performance_type: Option<PerformanceType>,
    pub collectibility_type: Option<CollectibilityType>,
    pub gender_restriction: Option<Gender>,
    pub age_restriction: Option<AgeCategory>,
    pub color_restriction: Option<ColorRestriction>,
    pub scale_restriction: Option<ScaleCategory>,
    pub division_id: i64,
    pub show_id: i64,
    /// Filled by joined reads
    pub division_name: Option<String>,
    pub show_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl ShowClass {
    pub fn new(name: impl Into<String>, class_number: i32, division_id: i64, show_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            class_number,
            max_entries: Some(sr_common::DEFAULT_MAX_ENTRIES),
            sort_order: 0,
            breed_category: None,
            finish_type: None,
            performance_type: None,
            collectibility_type: None,
            gender_restriction: None,
            age_restriction: None,
            color_restriction: None,
            scale_restriction: None,
            division_id,
            show_id,
            division_name: None,
            show_name: None,
            created_at: Utc::now(),
            updated_at: None,
            is_deleted: false,
        }
    }

    pub fn from_request(req: &ShowClassRequest) -> Result<Self> {
        let mut class = ShowClass::new(req.name.clone(), req.class_number, req.division_id, req.show_id);
        class.apply_request(req)?;
        Ok(class)
    }

    /// Copy editable fields from a request; unknown category names are rejected.
    pub fn apply_request(&mut self, req: &ShowClassRequest) -> Result<()> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(PlatformError::validation("Class name is required"));
        }
        if req.class_number < 1 {
            return Err(PlatformError::validation("Class number must be positive"));
        }
        if matches!(req.max_entries, Some(max) if max < 1) {
            return Err(PlatformError::validation("maxEntries must be at least 1"));
        }

        self.breed_category = parse_optional(req.breed_category.as_deref())?;
        self.finish_type = parse_optional(req.finish_type.as_deref())?;
        self.performance_type = parse_optional(req.performance_type.as_deref())?;
        self.collectibility_type = parse_optional(req.collectibility_type.as_deref())?;
        self.gender_restriction = parse_optional(req.gender_restriction.as_deref())?;
        self.age_restriction = parse_optional(req.age_restriction.as_deref())?;
        self.color_restriction = parse_optional(req.color_restriction.as_deref())?;
        self.scale_restriction = parse_optional(req.scale_restriction.as_deref())?;
        self.name = name.to_string();
        self.description = req.description.clone();
        self.class_number = req.class_number;
        self.max_entries = req.max_entries;
        self.sort_order = req.sort_order;
        self.division_id = req.division_id;
        self.show_id = req.show_id;
        Ok(())
    }

    pub fn has_capacity_for(&self, current_entries: i64) -> bool {
        self.max_entries.map_or(true, |max| current_entries < i64::from(max))
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let mut class = ShowClass::new("Arabian Halter", 101, 1, 1);
        assert_eq!(class.max_entries, Some(3));
        assert!(class.has_capacity_for(2));
        assert!(!class.has_capacity_for(3));

        class.max_entries = None;
        assert!(class.has_capacity_for(500));
    }

    #[test]
    fn test_from_request_parses_categories() {
        let req = ShowClassRequest {
            name: "Stock Breeds Halter".to_string(),
            class_number: 12,
            max_entries: Some(10),
            breed_category: Some("stockbreeds".to_string()),
            scale_restriction: Some("".to_string()),
            division_id: 2,
            show_id: 1,
            ..Default::default()
        };
        let class = ShowClass::from_request(&req).unwrap();
        assert_eq!(class.breed_category, Some(BreedCategory::StockBreeds));
        assert_eq!(class.scale_restriction, None);
        assert_eq!(class.max_entries, Some(10));

        let bad = ShowClassRequest { finish_type: Some("Painted".to_string()), ..req };
        assert!(ShowClass::from_request(&bad).is_err());
    }

    #[test]
    fn test_category_names() {
        assert_eq!("breyermodels".parse::<CollectibilityType>().unwrap(), CollectibilityType::BreyerModels);
        assert_eq!(ScaleCategory::Stablemate.as_str(), "Stablemate");
        assert_eq!(PerformanceType::ALL.len(), 14);
    }
}
