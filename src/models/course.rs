use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{format_date, format_time, to_utc};

/// Reference to an image held by the external object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseImage {
    #[serde(alias = "publicId")]
    pub public_id: String,
    pub url: String,
}

/// Course document (collection `courses`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: CourseImage,
    /// Admin that created the course; only that admin may change it.
    pub creator_id: ObjectId,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Base64 encoded image sent alongside course fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// `image/png`, `image/jpg` or `image/jpeg`
    pub mime_type: String,
    /// Base64 (standard alphabet), optionally as a `data:` URI
    pub data: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

/// Either a fresh upload or a reference to an image already stored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UpdateImage {
    Upload(ImagePayload),
    Existing(CourseImage),
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<UpdateImage>,
}

/// Fields to overwrite on an existing course. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<CourseImage>,
}

impl CourseChanges {
    pub fn apply(&self, course: &mut Course) {
        if let Some(title) = &self.title {
            course.title = title.clone();
        }
        if let Some(description) = &self.description {
            course.description = description.clone();
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(image) = &self.image {
            course.image = image.clone();
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: CourseImage,
    pub creator_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub formatted_created_at: String,
    pub formatted_updated_at: String,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        CourseResponse {
            id: course.id.to_hex(),
            title: course.title,
            description: course.description,
            price: course.price,
            image: course.image,
            creator_id: course.creator_id.to_hex(),
            created_at: to_utc(course.created_at),
            updated_at: to_utc(course.updated_at),
            formatted_created_at: format_date(course.created_at),
            formatted_updated_at: format_time(course.updated_at),
        }
    }
}
