use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::Store;
use crate::models::{Account, Course, CourseChanges, Order, PrincipalKind, Purchase};
use crate::utils::AppError;

#[derive(Default)]
struct Collections {
    accounts: HashMap<PrincipalKind, Vec<Account>>,
    courses: Vec<Course>,
    purchases: Vec<Purchase>,
    orders: Vec<Order>,
}

/// Process-local store for development without MongoDB and for tests.
///
/// Every uniqueness check runs under the same write lock as the insert, so
/// concurrent purchases of one course by one user leave exactly one record.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn orders(&self) -> Vec<Order> {
        self.inner.read().await.orders.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_account(&self, kind: PrincipalKind, id: &ObjectId) -> Result<Option<Account>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .get(&kind)
            .and_then(|accounts| accounts.iter().find(|a| a.id == *id).cloned()))
    }

    async fn find_account_by_email(&self, kind: PrincipalKind, email: &str) -> Result<Option<Account>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .get(&kind)
            .and_then(|accounts| accounts.iter().find(|a| a.email == email).cloned()))
    }

    async fn insert_account(&self, kind: PrincipalKind, account: &Account) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let accounts = inner.accounts.entry(kind).or_default();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AppError::AlreadyExists(format!("{} already exists", kind.label())));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        self.inner.write().await.courses.push(course.clone());
        Ok(())
    }

    async fn find_course(&self, id: &ObjectId) -> Result<Option<Course>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.courses.iter().find(|c| c.id == *id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let mut courses = self.inner.read().await.courses.clone();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn find_courses(&self, ids: &[ObjectId]) -> Result<Vec<Course>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn update_course(
        &self,
        id: &ObjectId,
        creator_id: &ObjectId,
        changes: &CourseChanges,
    ) -> Result<Option<Course>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(course) = inner
            .courses
            .iter_mut()
            .find(|c| c.id == *id && c.creator_id == *creator_id)
        else {
            return Ok(None);
        };
        changes.apply(course);
        course.updated_at = BsonDateTime::now();
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: &ObjectId, creator_id: &ObjectId) -> Result<Option<Course>, AppError> {
        let mut inner = self.inner.write().await;
        let position = inner
            .courses
            .iter()
            .position(|c| c.id == *id && c.creator_id == *creator_id);
        Ok(position.map(|index| inner.courses.remove(index)))
    }

    async fn find_purchase(&self, user_id: &ObjectId, course_id: &ObjectId) -> Result<Option<Purchase>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .purchases
            .iter()
            .find(|p| p.user_id == *user_id && p.course_id == *course_id)
            .cloned())
    }

    async fn list_purchases(&self, user_id: &ObjectId) -> Result<Vec<Purchase>, AppError> {
        let inner = self.inner.read().await;
        let mut purchases: Vec<Purchase> = inner
            .purchases
            .iter()
            .filter(|p| p.user_id == *user_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(purchases)
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner
            .purchases
            .iter()
            .any(|p| p.user_id == purchase.user_id && p.course_id == purchase.course_id)
        {
            return Err(AppError::AlreadyExists(
                "User has already purchased this course".to_string(),
            ));
        }
        inner.purchases.push(purchase.clone());
        Ok(())
    }

    async fn delete_purchase(&self, id: &ObjectId) -> Result<(), AppError> {
        self.inner.write().await.purchases.retain(|p| p.id != *id);
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
        self.inner.write().await.orders.push(order.clone());
        Ok(())
    }
}
