use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Активная сессия: токен и личность пользователя.
pub struct Session {
    /// Непрозрачный токен, подтверждающий личность перед бэкендом.
    pub token: String,
    /// Пользователь, которому выдан токен.
    pub user: User,
}

#[derive(Debug, Clone, Default)]
/// Контекст сессии, внедряемый в клиент при создании.
///
/// Читается при каждом исходящем запросе, пишется при входе и выходе.
/// Клоны разделяют одно состояние.
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Пустое хранилище: запросы пойдут неаутентифицированными.
    pub fn new() -> Self {
        Self::default()
    }

    /// Хранилище с уже известной сессией (например, восстановленной с диска).
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Текущий токен, если сессия активна.
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|session| session.token.clone())
    }

    /// Текущий пользователь, если сессия активна.
    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|session| session.user.clone())
    }

    /// Копия всей сессии.
    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    /// Активна ли сессия.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Устанавливает сессию после успешного входа.
    pub fn set(&self, token: impl Into<String>, user: User) {
        *self.write() = Some(Session {
            token: token.into(),
            user,
        });
    }

    /// Сбрасывает сессию.
    pub fn clear(&self) {
        *self.write() = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
