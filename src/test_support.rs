//! Fakes and fixtures shared by service and handler tests.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::AuthSettings;
use crate::database::{MemoryStore, Store};
use crate::models::{Account, Course, CourseChanges, CourseImage, Order, PrincipalKind, Purchase};
use crate::services::auth_service::{self, SignupRequest};
use crate::services::image_service::{ImageStore, ImageUpload};
use crate::services::payment_service::{NewPaymentIntent, PaymentGateway, PaymentIntent, STATUS_SUCCEEDED};
use crate::state::AppState;
use crate::utils::AppError;

/// Image store that hands out `courses/<n>` ids and remembers every call.
#[derive(Default)]
pub struct RecordingImageStore {
    uploaded: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<String>>,
}

impl RecordingImageStore {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, _image: &ImageUpload) -> Result<CourseImage, AppError> {
        let mut uploaded = self.uploaded.lock().unwrap();
        let public_id = format!("courses/{}", uploaded.len() + 1);
        uploaded.push(public_id.clone());
        Ok(CourseImage {
            url: format!("https://img.test/{}.png", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// In-process payment processor. Intents start as `requires_payment_method`
/// until a test settles them with [`FakePaymentGateway::mark_succeeded`].
#[derive(Default)]
pub struct FakePaymentGateway {
    intents: Mutex<Vec<(PaymentIntent, String)>>,
    unavailable: bool,
}

impl FakePaymentGateway {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.intents.lock().unwrap().iter().map(|(_, d)| d.clone()).collect()
    }

    pub fn mark_succeeded(&self, id: &str) {
        let mut intents = self.intents.lock().unwrap();
        if let Some((intent, _)) = intents.iter_mut().find(|(i, _)| i.id == id) {
            intent.status = STATUS_SUCCEEDED.to_string();
        }
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_intent(&self, request: &NewPaymentIntent) -> Result<PaymentIntent, AppError> {
        if self.unavailable {
            return Err(AppError::Payment("processor unavailable".to_string()));
        }
        let mut intents = self.intents.lock().unwrap();
        let id = format!("pi_test_{}", intents.len() + 1);
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret", id)),
            id,
            amount: request.amount,
            currency: "inr".to_string(),
            status: "requires_payment_method".to_string(),
            metadata: HashMap::from([
                ("user_id".to_string(), request.user_id.clone()),
                ("course_id".to_string(), request.course_id.clone()),
            ]),
        };
        intents.push((intent.clone(), request.description.clone()));
        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, AppError> {
        if self.unavailable {
            return Err(AppError::Payment("processor unavailable".to_string()));
        }
        self.intents
            .lock()
            .unwrap()
            .iter()
            .find(|(i, _)| i.id == id)
            .map(|(i, _)| i.clone())
            .ok_or_else(|| AppError::Payment(format!("No such payment_intent: '{}'", id)))
    }
}

/// Memory store whose order inserts fail until [`FailingOrderStore::recover`].
pub struct FailingOrderStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FailingOrderStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for FailingOrderStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }

    async fn find_account(&self, kind: PrincipalKind, id: &ObjectId) -> Result<Option<Account>, AppError> {
        self.inner.find_account(kind, id).await
    }

    async fn find_account_by_email(&self, kind: PrincipalKind, email: &str) -> Result<Option<Account>, AppError> {
        self.inner.find_account_by_email(kind, email).await
    }

    async fn insert_account(&self, kind: PrincipalKind, account: &Account) -> Result<(), AppError> {
        self.inner.insert_account(kind, account).await
    }

    async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        self.inner.insert_course(course).await
    }

    async fn find_course(&self, id: &ObjectId) -> Result<Option<Course>, AppError> {
        self.inner.find_course(id).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.inner.list_courses().await
    }

    async fn find_courses(&self, ids: &[ObjectId]) -> Result<Vec<Course>, AppError> {
        self.inner.find_courses(ids).await
    }

    async fn update_course(
        &self,
        id: &ObjectId,
        creator_id: &ObjectId,
        changes: &CourseChanges,
    ) -> Result<Option<Course>, AppError> {
        self.inner.update_course(id, creator_id, changes).await
    }

    async fn delete_course(&self, id: &ObjectId, creator_id: &ObjectId) -> Result<Option<Course>, AppError> {
        self.inner.delete_course(id, creator_id).await
    }

    async fn find_purchase(&self, user_id: &ObjectId, course_id: &ObjectId) -> Result<Option<Purchase>, AppError> {
        self.inner.find_purchase(user_id, course_id).await
    }

    async fn list_purchases(&self, user_id: &ObjectId) -> Result<Vec<Purchase>, AppError> {
        self.inner.list_purchases(user_id).await
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError> {
        self.inner.insert_purchase(purchase).await
    }

    async fn delete_purchase(&self, id: &ObjectId) -> Result<(), AppError> {
        self.inner.delete_purchase(id).await
    }

    async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Database("orders collection unavailable".to_string()));
        }
        self.inner.insert_order(order).await
    }
}

pub async fn seed_account(store: &dyn Store, kind: PrincipalKind, email: &str) -> Account {
    auth_service::signup(
        store,
        kind,
        &SignupRequest {
            first_name: "Test".into(),
            last_name: "Account".into(),
            email: email.into(),
            password: "password1".into(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_user(store: &dyn Store, email: &str) -> Account {
    seed_account(store, PrincipalKind::User, email).await
}

pub async fn seed_course(store: &dyn Store, creator_id: ObjectId, price: f64) -> Course {
    let id = ObjectId::new();
    let now = BsonDateTime::now();
    let course = Course {
        id,
        title: format!("Course {}", id),
        description: "Seeded course".into(),
        price,
        image: CourseImage {
            public_id: format!("courses/seed-{}", id),
            url: format!("https://img.test/seed-{}.png", id),
        },
        creator_id,
        created_at: now,
        updated_at: now,
    };
    store.insert_course(&course).await.unwrap();
    course
}

/// Concrete fakes behind an [`AppState`], kept around for assertions.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub payments: Arc<FakePaymentGateway>,
    pub images: Arc<RecordingImageStore>,
    pub auth: AuthSettings,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            payments: Arc::new(FakePaymentGateway::default()),
            images: Arc::new(RecordingImageStore::default()),
            auth: AuthSettings {
                user_secret: "test-user-secret".into(),
                admin_secret: "test-admin-secret".into(),
                token_ttl_hours: 1,
            },
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            payments: self.payments.clone(),
            images: self.images.clone(),
            auth: self.auth.clone(),
        }
    }

    pub fn token(&self, kind: PrincipalKind, id: &ObjectId) -> String {
        auth_service::issue_token(&self.auth, kind, id).unwrap()
    }

    pub fn bearer(&self, kind: PrincipalKind, id: &ObjectId) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token(kind, id)))
    }
}
