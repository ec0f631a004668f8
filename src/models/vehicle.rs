use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{NumberValidator, StringValidator, ValidationError, Validator};
use crate::catalog::CatalogItem;

#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub id: String,
    pub slug: String,
    pub kind: String, // "car" / "bus"
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vehicle_class: String, // economy, suv, business, minibus ...
    pub price_per_day: i64,
    pub seats: i32,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub image_url: Option<String>,
    pub gallery: String, // JSON array as string
    pub description: Option<String>,
    pub popularity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Car,
    Bus,
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleKind::Car => write!(f, "car"),
            VehicleKind::Bus => write!(f, "bus"),
        }
    }
}

impl std::str::FromStr for VehicleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(VehicleKind::Car),
            "bus" => Ok(VehicleKind::Bus),
            _ => Err(format!("Invalid vehicle kind: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub kind: VehicleKind,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vehicle_class: String,
    pub price_per_day: i64,
    pub seats: i32,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub image_url: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub description: Option<String>,
    pub popularity: Option<i32>,
}

impl Vehicle {
    pub fn from_create_request(request: CreateVehicleRequest) -> Result<Self, ValidationError> {
        let gallery = request.gallery.unwrap_or_default();

        let id = uuid::Uuid::new_v4().to_string();
        let slug = slugify(&format!(
            "{} {} {} {}",
            request.brand,
            request.model,
            request.year,
            &id[..8]
        ));

        let now = Utc::now();
        let vehicle = Self {
            id,
            slug,
            kind: request.kind.to_string(),
            brand: request.brand.trim().to_string(),
            model: request.model.trim().to_string(),
            year: request.year,
            vehicle_class: request.vehicle_class.trim().to_lowercase(),
            price_per_day: request.price_per_day,
            seats: request.seats,
            transmission: request.transmission,
            fuel: request.fuel,
            image_url: request.image_url,
            gallery: serde_json::to_string(&gallery).map_err(|_| ValidationError::InvalidJson)?,
            description: request.description,
            popularity: request.popularity.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        vehicle.validate()?;
        Ok(vehicle)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    pub fn get_kind(&self) -> Result<VehicleKind, String> {
        self.kind.parse()
    }

    pub fn get_gallery(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.gallery)
    }
}

impl Validator for Vehicle {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        StringValidator::validate_name(&self.brand)?;
        StringValidator::validate_name(&self.model)?;
        StringValidator::validate_class(&self.vehicle_class)?;
        StringValidator::validate_description(&self.description)?;
        StringValidator::validate_url(&self.image_url)?;
        NumberValidator::validate_year(self.year)?;
        NumberValidator::validate_price(self.price_per_day)?;
        NumberValidator::validate_seats(self.seats)?;
        let gallery = self.get_gallery().map_err(|_| ValidationError::InvalidJson)?;
        for url in gallery {
            StringValidator::validate_url(&Some(url))?;
        }
        Ok(())
    }
}

impl CatalogItem for Vehicle {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.vehicle_class)
    }

    fn price(&self) -> i64 {
        self.price_per_day
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn category(&self) -> &str {
        &self.vehicle_class
    }

    fn popularity(&self) -> i32 {
        self.popularity
    }
}

/// 对外返回的车辆数据，图片已按回退规则解析
#[derive(Debug, Clone, Serialize)]
pub struct VehicleResponse {
    pub id: String,
    pub slug: String,
    pub kind: String,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vehicle_class: String,
    pub price_per_day: i64,
    pub seats: i32,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub image: String,
    pub gallery: Vec<String>,
    pub description: Option<String>,
    pub popularity: i32,
}

impl VehicleResponse {
    /// `image` 由调用方解析，见 [`resolve_image`](crate::services::storage::resolve_image)
    pub fn new(vehicle: Vehicle, image: String) -> Self {
        let gallery = vehicle.get_gallery().unwrap_or_default();
        Self {
            name: vehicle.display_name(),
            id: vehicle.id,
            slug: vehicle.slug,
            kind: vehicle.kind,
            brand: vehicle.brand,
            model: vehicle.model,
            year: vehicle.year,
            vehicle_class: vehicle.vehicle_class,
            price_per_day: vehicle.price_per_day,
            seats: vehicle.seats,
            transmission: vehicle.transmission,
            fuel: vehicle.fuel,
            image,
            gallery,
            description: vehicle.description,
            popularity: vehicle.popularity,
        }
    }
}

/// 生成 URL 友好的 slug：小写字母数字，其余字符折叠为单个连字符
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateVehicleRequest {
        CreateVehicleRequest {
            kind: VehicleKind::Car,
            brand: "BMW".to_string(),
            model: "X5 xDrive".to_string(),
            year: 2022,
            vehicle_class: "SUV".to_string(),
            price_per_day: 120,
            seats: 5,
            transmission: Some("automatic".to_string()),
            fuel: None,
            image_url: None,
            gallery: Some(vec!["https://cdn.example.com/x5-side.webp".to_string()]),
            description: None,
            popularity: None,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("BMW X5 xDrive 2022"), "bmw-x5-xdrive-2022");
        assert_eq!(slugify("  Mercedes-Benz / Sprinter  "), "mercedes-benz-sprinter");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_from_create_request() {
        let vehicle = Vehicle::from_create_request(request()).expect("Should create vehicle");
        assert_eq!(vehicle.kind, "car");
        assert_eq!(vehicle.vehicle_class, "suv");
        assert!(vehicle.slug.starts_with("bmw-x5-xdrive-2022-"));
        assert_eq!(vehicle.get_gallery().unwrap().len(), 1);
        assert_eq!(vehicle.get_kind().unwrap(), VehicleKind::Car);
        assert!(vehicle.validate().is_ok());
    }

    #[test]
    fn test_from_create_request_rejects_invalid_input() {
        let mut bad = request();
        bad.price_per_day = -5;
        assert!(matches!(
            Vehicle::from_create_request(bad),
            Err(ValidationError::InvalidPrice(-5))
        ));

        let mut bad = request();
        bad.brand = "  ".to_string();
        assert!(matches!(
            Vehicle::from_create_request(bad),
            Err(ValidationError::EmptyName)
        ));

        let mut bad = request();
        bad.gallery = Some(vec!["ftp://nope".to_string()]);
        assert!(matches!(
            Vehicle::from_create_request(bad),
            Err(ValidationError::InvalidUrl(_))
        ));

        let mut bad = request();
        bad.year = 1800;
        assert!(matches!(
            Vehicle::from_create_request(bad),
            Err(ValidationError::InvalidYear(1800))
        ));
    }

    #[test]
    fn test_validate_checks_stored_fields() {
        let mut vehicle = Vehicle::from_create_request(request()).unwrap();
        assert!(vehicle.validate().is_ok());

        vehicle.seats = 0;
        assert!(vehicle.validate().is_err());

        let mut vehicle = Vehicle::from_create_request(request()).unwrap();
        vehicle.gallery = "not json".to_string();
        assert!(matches!(vehicle.validate(), Err(ValidationError::InvalidJson)));
    }

    #[test]
    fn test_catalog_item_search_text() {
        let vehicle = Vehicle::from_create_request(request()).unwrap();
        assert!(vehicle.search_text().contains("BMW"));
        assert!(vehicle.search_text().contains("suv"));
    }
}
