use std::sync::Arc;
use std::time::Duration;

use futures::lock::Mutex;
use moka::future::Cache;
use uuid::Uuid;

use crate::model::form_state::FormCalculationState;

/// One open form. The lock is never held across a holiday lookup.
pub type SharedForm = Arc<Mutex<FormCalculationState>>;

#[derive(Clone)]
struct FormSession {
    owner: u64,
    form: SharedForm,
}

/// Open leave forms keyed by form id, dropped after sitting idle. A form is
/// only visible to the user who opened it.
#[derive(Clone)]
pub struct FormSessionStore {
    forms: Cache<Uuid, FormSession>,
}

impl FormSessionStore {
    pub fn new(max_capacity: u64, idle_ttl: Duration) -> Self {
        Self {
            forms: Cache::builder()
                .max_capacity(max_capacity) // tune based on concurrent users
                .time_to_idle(idle_ttl)
                .eviction_listener(|id, _, cause| {
                    log::debug!("Leave form {} dropped: {:?}", id, cause);
                })
                .build(),
        }
    }

    /// Stores a new form for `owner` and returns its id
    pub async fn open(&self, owner: u64, state: FormCalculationState) -> (Uuid, SharedForm) {
        let id = Uuid::new_v4();
        let form = Arc::new(Mutex::new(state));
        self.forms
            .insert(
                id,
                FormSession {
                    owner,
                    form: form.clone(),
                },
            )
            .await;
        (id, form)
    }

    /// `None` for unknown, expired, or someone else's form.
    pub async fn get(&self, id: &Uuid, user_id: u64) -> Option<SharedForm> {
        self.forms
            .get(id)
            .await
            .filter(|session| session.owner == user_id)
            .map(|session| session.form)
    }

    /// Returns false when there was no such form for this user.
    pub async fn close(&self, id: &Uuid, user_id: u64) -> bool {
        if self.get(id, user_id).await.is_none() {
            return false;
        }
        self.forms.invalidate(id).await;
        true
    }
}
