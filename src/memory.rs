//! In-memory stores and a recording notifier for the test suite.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::otp::{OtpNotifier, OtpPurpose};
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, Role, User};
use crate::products::repo::ProductRepo;
use crate::products::repo_types::Product;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserRepo {
    pub fn promote(&self, email: &str) {
        if let Some(u) = self.users.lock().unwrap().get_mut(email) {
            u.role = Role::Admin;
        }
    }

    fn update<F: FnOnce(&mut User) -> bool>(&self, email: &str, f: F) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(email)?;
        f(&mut *user).then(|| user.clone())
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&new.email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email.clone(),
            password_hash: new.password_hash,
            role: Role::User,
            is_verified: false,
            otp: Some(new.otp),
            otp_expires: Some(new.otp_expires),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(new.email, user.clone());
        Ok(Some(user))
    }

    async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        Ok(self.update(email, |u| {
            let live = u.otp.as_deref() == Some(otp) && u.otp_expires.is_some_and(|e| e > now);
            if live {
                u.is_verified = true;
                u.otp = None;
                u.otp_expires = None;
            }
            live
        }))
    }

    async fn set_otp(
        &self,
        email: &str,
        otp: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        Ok(self.update(email, |u| {
            u.otp = Some(otp.to_string());
            u.otp_expires = Some(expires);
            true
        }))
    }

    async fn reset_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        Ok(self.update(email, |u| {
            u.password_hash = password_hash.to_string();
            u.is_verified = true;
            u.otp = None;
            u.otp_expires = None;
            true
        }))
    }
}

#[derive(Default)]
pub struct MemoryProductRepo {
    products: Mutex<Vec<Product>>,
}

#[async_trait]
impl ProductRepo for MemoryProductRepo {
    async fn create(&self, doc: Map<String, Value>) -> anyhow::Result<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            fields: doc,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn list(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, OtpPurpose)>>,
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<(String, String, OtpPurpose)> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _, _)| to == email)
            .map(|(_, code, _)| code.clone())
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn deliver(&self, email: &str, code: &str, purpose: OtpPurpose) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string(), purpose));
        Ok(())
    }
}
