use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::error::{ErrorKind, WriteError, WriteFailure};
use mongodb::options::ReturnDocument;

use super::MongoDB;
use crate::models::{Account, Course, CourseChanges, Order, PrincipalKind, Purchase};
use crate::utils::AppError;

const COURSES: &str = "courses";
const PURCHASES: &str = "purchases";
const ORDERS: &str = "orders";

/// Persistence seam used by every service.
///
/// Inserts that would break a uniqueness rule (account email per kind,
/// purchase per user and course) fail with [`AppError::AlreadyExists`]
/// instead of writing a duplicate.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_account(&self, kind: PrincipalKind, id: &ObjectId) -> Result<Option<Account>, AppError>;
    async fn find_account_by_email(&self, kind: PrincipalKind, email: &str) -> Result<Option<Account>, AppError>;
    async fn insert_account(&self, kind: PrincipalKind, account: &Account) -> Result<(), AppError>;

    async fn insert_course(&self, course: &Course) -> Result<(), AppError>;
    async fn find_course(&self, id: &ObjectId) -> Result<Option<Course>, AppError>;
    /// Newest first.
    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn find_courses(&self, ids: &[ObjectId]) -> Result<Vec<Course>, AppError>;
    /// Applies `changes` only if `creator_id` owns the course; returns the updated course.
    async fn update_course(
        &self,
        id: &ObjectId,
        creator_id: &ObjectId,
        changes: &CourseChanges,
    ) -> Result<Option<Course>, AppError>;
    /// Removes the course only if `creator_id` owns it; returns what was removed.
    async fn delete_course(&self, id: &ObjectId, creator_id: &ObjectId) -> Result<Option<Course>, AppError>;

    async fn find_purchase(&self, user_id: &ObjectId, course_id: &ObjectId) -> Result<Option<Purchase>, AppError>;
    async fn list_purchases(&self, user_id: &ObjectId) -> Result<Vec<Purchase>, AppError>;
    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError>;
    /// Removes a purchase by id; used to undo a purchase whose order was not written.
    async fn delete_purchase(&self, id: &ObjectId) -> Result<(), AppError>;

    async fn insert_order(&self, order: &Order) -> Result<(), AppError>;
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code: 11000, .. }))
    )
}

fn map_insert_error(err: mongodb::error::Error, duplicate_message: &str) -> AppError {
    if is_duplicate_key(&err) {
        AppError::AlreadyExists(duplicate_message.to_string())
    } else {
        AppError::from(err)
    }
}

#[async_trait]
impl Store for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        self.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_account(&self, kind: PrincipalKind, id: &ObjectId) -> Result<Option<Account>, AppError> {
        Ok(self
            .collection::<Account>(kind.collection())
            .find_one(doc! { "_id": *id })
            .await?)
    }

    async fn find_account_by_email(&self, kind: PrincipalKind, email: &str) -> Result<Option<Account>, AppError> {
        Ok(self
            .collection::<Account>(kind.collection())
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn insert_account(&self, kind: PrincipalKind, account: &Account) -> Result<(), AppError> {
        self.collection::<Account>(kind.collection())
            .insert_one(account)
            .await
            .map_err(|e| map_insert_error(e, &format!("{} already exists", kind.label())))?;
        Ok(())
    }

    async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        self.collection::<Course>(COURSES).insert_one(course).await?;
        Ok(())
    }

    async fn find_course(&self, id: &ObjectId) -> Result<Option<Course>, AppError> {
        Ok(self.collection::<Course>(COURSES).find_one(doc! { "_id": *id }).await?)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let cursor = self
            .collection::<Course>(COURSES)
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_courses(&self, ids: &[ObjectId]) -> Result<Vec<Course>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection::<Course>(COURSES)
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_course(
        &self,
        id: &ObjectId,
        creator_id: &ObjectId,
        changes: &CourseChanges,
    ) -> Result<Option<Course>, AppError> {
        let mut set = doc! { "updatedAt": BsonDateTime::now() };
        if let Some(title) = &changes.title {
            set.insert("title", title.as_str());
        }
        if let Some(description) = &changes.description {
            set.insert("description", description.as_str());
        }
        if let Some(price) = changes.price {
            set.insert("price", price);
        }
        if let Some(image) = &changes.image {
            set.insert("image", mongodb::bson::to_bson(image)?);
        }

        Ok(self
            .collection::<Course>(COURSES)
            .find_one_and_update(doc! { "_id": *id, "creatorId": *creator_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_course(&self, id: &ObjectId, creator_id: &ObjectId) -> Result<Option<Course>, AppError> {
        Ok(self
            .collection::<Course>(COURSES)
            .find_one_and_delete(doc! { "_id": *id, "creatorId": *creator_id })
            .await?)
    }

    async fn find_purchase(&self, user_id: &ObjectId, course_id: &ObjectId) -> Result<Option<Purchase>, AppError> {
        Ok(self
            .collection::<Purchase>(PURCHASES)
            .find_one(doc! { "userId": *user_id, "courseId": *course_id })
            .await?)
    }

    async fn list_purchases(&self, user_id: &ObjectId) -> Result<Vec<Purchase>, AppError> {
        let cursor = self
            .collection::<Purchase>(PURCHASES)
            .find(doc! { "userId": *user_id })
            .sort(doc! { "purchaseDate": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError> {
        self.collection::<Purchase>(PURCHASES)
            .insert_one(purchase)
            .await
            .map_err(|e| map_insert_error(e, "User has already purchased this course"))?;
        Ok(())
    }

    async fn delete_purchase(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection::<Purchase>(PURCHASES).delete_one(doc! { "_id": *id }).await?;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
        self.collection::<Order>(ORDERS).insert_one(order).await?;
        Ok(())
    }
}
