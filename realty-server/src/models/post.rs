//! Property listings, their detail records and the list filter

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Profile, ValidationError};

/// Whether a listing is for sale or for rent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Buy,
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Rent => "rent",
        }
    }
}

impl FromStr for ListingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "rent" => Ok(Self::Rent),
            other => Err(ValidationError::InvalidVariant {
                field: "type",
                value: other.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for ListingType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Property category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Apartment,
    House,
    Condo,
    Land,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Condo => "condo",
            Self::Land => "land",
        }
    }
}

impl FromStr for PropertyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apartment" => Ok(Self::Apartment),
            "house" => Ok(Self::House),
            "condo" => Ok(Self::Condo),
            "land" => Ok(Self::Land),
            other => Err(ValidationError::InvalidVariant {
                field: "property",
                value: other.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for PropertyKind {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Post record from database
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub price: i64,
    pub images: Vec<String>,
    pub address: String,
    pub city: String,
    pub bedroom: i32,
    pub bathroom: i32,
    pub latitude: String,
    pub longitude: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub listing_type: ListingType,
    #[sqlx(try_from = "String")]
    pub property: PropertyKind,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Extended attributes of a post (1:1)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: Uuid,
    #[serde(rename = "desc")]
    pub description: String,
    pub utilities: Option<String>,
    pub pet: Option<String>,
    pub income: Option<String>,
    pub size: Option<i32>,
    pub school: Option<i32>,
    pub bus: Option<i32>,
    pub restaurant: Option<i32>,
    pub post_id: Uuid,
}

/// A post joined with its detail record and owner profile
#[derive(Debug, Clone)]
pub struct PostWithDetail {
    pub post: Post,
    pub detail: Option<PostDetail>,
    pub owner: Profile,
}

/// Public owner fields shown on a single post
#[derive(Debug, Clone, Serialize)]
pub struct PostOwner {
    pub username: String,
    pub avatar: Option<String>,
}

/// Single post response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub post_detail: Option<PostDetail>,
    pub user: PostOwner,
    pub is_saved: bool,
}

impl PostView {
    pub fn new(found: PostWithDetail, is_saved: bool) -> Self {
        Self {
            post: found.post,
            post_detail: found.detail,
            user: PostOwner {
                username: found.owner.username,
                avatar: found.owner.avatar,
            },
            is_saved,
        }
    }
}

/// Post fields accepted from clients.
///
/// Any owner field in the payload is ignored; the owner is always the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub title: String,
    pub price: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub address: String,
    pub city: String,
    pub bedroom: i32,
    pub bathroom: i32,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub property: PropertyKind,
}

/// Detail fields accepted from clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDetailData {
    #[serde(default, rename = "desc")]
    pub description: String,
    pub utilities: Option<String>,
    pub pet: Option<String>,
    pub income: Option<String>,
    pub size: Option<i32>,
    pub school: Option<i32>,
    pub bus: Option<i32>,
    pub restaurant: Option<i32>,
}

/// Create/update request body: `{postData, postDetail}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub post_data: PostData,
    #[serde(default)]
    pub post_detail: PostDetailData,
}

impl PostInput {
    /// Check the fields a listing cannot do without.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let data = &self.post_data;
        if data.title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if data.city.trim().is_empty() {
            return Err(ValidationError::Empty { field: "city" });
        }
        if data.price < 0 {
            return Err(ValidationError::Negative { field: "price" });
        }
        if data.bedroom < 0 {
            return Err(ValidationError::Negative { field: "bedroom" });
        }
        if data.bathroom < 0 {
            return Err(ValidationError::Negative { field: "bathroom" });
        }
        Ok(())
    }
}

/// Post fields an update may change. `None` leaves the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDataPatch {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub images: Option<Vec<String>>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub bedroom: Option<i32>,
    pub bathroom: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub property: Option<PropertyKind>,
}

/// Detail fields an update may change. `None` leaves the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDetailPatch {
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub utilities: Option<String>,
    pub pet: Option<String>,
    pub income: Option<String>,
    pub size: Option<i32>,
    pub school: Option<i32>,
    pub bus: Option<i32>,
    pub restaurant: Option<i32>,
}

/// Update request body. Omitting `postDetail` keeps the stored detail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default)]
    pub post_data: PostDataPatch,
    pub post_detail: Option<PostDetailPatch>,
}

impl PostPatch {
    /// Check only the fields being changed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let data = &self.post_data;
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ValidationError::Empty { field: "title" });
        }
        if data.city.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ValidationError::Empty { field: "city" });
        }
        if data.price.is_some_and(|p| p < 0) {
            return Err(ValidationError::Negative { field: "price" });
        }
        if data.bedroom.is_some_and(|b| b < 0) {
            return Err(ValidationError::Negative { field: "bedroom" });
        }
        if data.bathroom.is_some_and(|b| b < 0) {
            return Err(ValidationError::Negative { field: "bathroom" });
        }
        Ok(())
    }
}

impl PostDataPatch {
    /// Overwrite the fields present in the patch.
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(price) = self.price {
            post.price = price;
        }
        if let Some(images) = &self.images {
            post.images = images.clone();
        }
        if let Some(address) = &self.address {
            post.address = address.clone();
        }
        if let Some(city) = &self.city {
            post.city = city.clone();
        }
        if let Some(bedroom) = self.bedroom {
            post.bedroom = bedroom;
        }
        if let Some(bathroom) = self.bathroom {
            post.bathroom = bathroom;
        }
        if let Some(latitude) = &self.latitude {
            post.latitude = latitude.clone();
        }
        if let Some(longitude) = &self.longitude {
            post.longitude = longitude.clone();
        }
        if let Some(listing_type) = self.listing_type {
            post.listing_type = listing_type;
        }
        if let Some(property) = self.property {
            post.property = property;
        }
    }
}

impl PostDetailPatch {
    /// Overwrite the fields present in the patch.
    pub fn apply(&self, detail: &mut PostDetail) {
        if let Some(description) = &self.description {
            detail.description = description.clone();
        }
        if self.utilities.is_some() {
            detail.utilities = self.utilities.clone();
        }
        if self.pet.is_some() {
            detail.pet = self.pet.clone();
        }
        if self.income.is_some() {
            detail.income = self.income.clone();
        }
        detail.size = self.size.or(detail.size);
        detail.school = self.school.or(detail.school);
        detail.bus = self.bus.or(detail.bus);
        detail.restaurant = self.restaurant.or(detail.restaurant);
    }
}

/// Raw list query parameters, kept as strings so bad values never reject the request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    pub property: Option<String>,
    pub bedroom: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Parsed list filter. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub city: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property: Option<PropertyKind>,
    pub bedroom: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
    non_empty(value).and_then(|v| v.parse().ok())
}

impl From<PostQuery> for PostFilter {
    fn from(query: PostQuery) -> Self {
        Self {
            city: non_empty(query.city),
            listing_type: parsed(query.listing_type),
            property: parsed(query.property),
            bedroom: parsed(query.bedroom),
            min_price: parsed(query.min_price),
            max_price: parsed(query.max_price),
        }
    }
}

impl PostFilter {
    /// Whether `post` satisfies every supplied constraint.
    pub fn matches(&self, post: &Post) -> bool {
        self.city.as_deref().map_or(true, |c| post.city == c)
            && self.listing_type.map_or(true, |t| post.listing_type == t)
            && self.property.map_or(true, |p| post.property == p)
            && self.bedroom.map_or(true, |b| post.bedroom == b)
            && self.min_price.map_or(true, |min| post.price >= min)
            && self.max_price.map_or(true, |max| post.price <= max)
    }
}
