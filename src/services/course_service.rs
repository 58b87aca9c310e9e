use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

use crate::database::Store;
use crate::models::{Course, CourseChanges, CreateCourseRequest, UpdateCourseRequest, UpdateImage};
use crate::services::image_service::{ImageStore, ImageUpload};
use crate::utils::AppError;

pub fn parse_course_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::InvalidRequest("Invalid course ID".to_string()))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

pub async fn create_course(
    store: &dyn Store,
    images: &dyn ImageStore,
    admin_id: &ObjectId,
    request: &CreateCourseRequest,
) -> Result<Course, AppError> {
    let (Some(title), Some(description), Some(price)) = (
        non_blank(&request.title),
        non_blank(&request.description),
        request.price.filter(|p| valid_price(*p)),
    ) else {
        return Err(AppError::InvalidRequest("All fields are required".to_string()));
    };

    let payload = request
        .image
        .as_ref()
        .ok_or_else(|| AppError::InvalidRequest("No image file uploaded".to_string()))?;
    let upload = ImageUpload::from_payload(payload)?;
    let image = images.upload(&upload).await?;

    let now = BsonDateTime::now();
    let course = Course {
        id: ObjectId::new(),
        title,
        description,
        price,
        image,
        creator_id: *admin_id,
        created_at: now,
        updated_at: now,
    };
    store.insert_course(&course).await?;

    log::info!("📚 Course created: {} by admin {}", course.id, admin_id);
    Ok(course)
}

pub async fn update_course(
    store: &dyn Store,
    images: &dyn ImageStore,
    admin_id: &ObjectId,
    course_id: &str,
    request: &UpdateCourseRequest,
) -> Result<Course, AppError> {
    let course_id = parse_course_id(course_id)?;
    let not_owner = || AppError::NotFound("can't update, created by other admin".to_string());

    let existing = store
        .find_course(&course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    if existing.creator_id != *admin_id {
        return Err(not_owner());
    }

    if let Some(price) = request.price {
        if !valid_price(price) {
            return Err(AppError::InvalidRequest("Price must be greater than zero".to_string()));
        }
    }

    // An existing reference must be the course's own image.
    let image = match &request.image {
        Some(UpdateImage::Upload(payload)) => {
            let upload = ImageUpload::from_payload(payload)?;
            Some(images.upload(&upload).await?)
        }
        Some(UpdateImage::Existing(image)) if image.public_id == existing.image.public_id => None,
        Some(UpdateImage::Existing(image)) => {
            log::warn!("⚠️  Course {} update refers to foreign image {}", course_id, image.public_id);
            return Err(AppError::InvalidRequest(
                "Image does not belong to this course".to_string(),
            ));
        }
        None => None,
    };
    let uploaded = image.as_ref().map(|img| img.public_id.clone());

    let changes = CourseChanges {
        title: non_blank(&request.title),
        description: non_blank(&request.description),
        price: request.price,
        image,
    };

    let updated = match store.update_course(&course_id, admin_id, &changes).await {
        Ok(Some(updated)) => updated,
        outcome => {
            if let Some(public_id) = &uploaded {
                if let Err(e) = images.destroy(public_id).await {
                    log::warn!("⚠️  Unused upload {} not removed: {}", public_id, e);
                }
            }
            return Err(outcome.err().unwrap_or_else(not_owner));
        }
    };

    // A replaced upload leaves the old image orphaned otherwise.
    if uploaded.is_some() {
        if let Err(e) = images.destroy(&existing.image.public_id).await {
            log::warn!("⚠️  Old image {} not removed: {}", existing.image.public_id, e);
        }
    }

    log::info!("✏️  Course updated: {}", updated.id);
    Ok(updated)
}

pub async fn delete_course(
    store: &dyn Store,
    images: &dyn ImageStore,
    admin_id: &ObjectId,
    course_id: &str,
) -> Result<(), AppError> {
    let course_id = parse_course_id(course_id)?;

    let deleted = store
        .delete_course(&course_id, admin_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Can't delete created by other admin".to_string()))?;

    if let Err(e) = images.destroy(&deleted.image.public_id).await {
        log::warn!("⚠️  Image {} not removed: {}", deleted.image.public_id, e);
    }

    log::info!("🗑️  Course deleted: {}", course_id);
    Ok(())
}

pub async fn list_courses(store: &dyn Store) -> Result<Vec<Course>, AppError> {
    store.list_courses().await
}

pub async fn course_details(store: &dyn Store, course_id: &str) -> Result<Course, AppError> {
    let course_id = parse_course_id(course_id)?;
    store
        .find_course(&course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}
