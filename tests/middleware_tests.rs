// tests/middleware_tests.rs

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tower::{Layer, ServiceBuilder};
use voteboard::{
    error::{AppError, ErrorKind},
    models::user::{NewUser, User},
    services::{
        UsersService,
        middleware::{Logging, LoggingLayer, Tracing, TracingLayer},
    },
};

type Calls = Arc<Mutex<Vec<String>>>;

/// Innermost fake service: records the call and fails unknown logins.
struct FakeUsers {
    calls: Calls,
}

#[async_trait]
impl UsersService for FakeUsers {
    async fn register(&self, user: NewUser, _password: &str) -> Result<User, AppError> {
        self.calls.lock().unwrap().push("service".to_string());
        Ok(User {
            id: 1,
            email: user.email,
            username: user.username,
            hash: String::new(),
            created_at: None,
        })
    }

    async fn login(&self, email: &str, _password: &str) -> Result<User, AppError> {
        self.calls.lock().unwrap().push("service".to_string());
        Err(AppError::not_found(format!("no user {email}")))
    }
}

/// Decorator recording when it is entered and left.
struct Record<S> {
    name: &'static str,
    calls: Calls,
    inner: S,
}

#[derive(Clone)]
struct RecordLayer {
    name: &'static str,
    calls: Calls,
}

impl<S> Layer<S> for RecordLayer {
    type Service = Record<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Record {
            name: self.name,
            calls: self.calls.clone(),
            inner,
        }
    }
}

#[async_trait]
impl<S: UsersService> UsersService for Record<S> {
    async fn register(&self, user: NewUser, password: &str) -> Result<User, AppError> {
        self.calls.lock().unwrap().push(format!("{} before", self.name));
        let result = self.inner.register(user, password).await;
        self.calls.lock().unwrap().push(format!("{} after", self.name));
        result
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        self.inner.login(email, password).await
    }
}

fn alice() -> NewUser {
    NewUser {
        email: "alice@example.com".to_string(),
        username: "alice".to_string(),
    }
}

#[tokio::test]
async fn first_listed_layer_is_outermost() {
    let calls = Calls::default();
    let record = |name| RecordLayer {
        name,
        calls: calls.clone(),
    };

    let users = ServiceBuilder::new()
        .layer(record("outer"))
        .layer(LoggingLayer)
        .layer(record("middle"))
        .layer(TracingLayer)
        .layer(record("inner"))
        .service(FakeUsers {
            calls: calls.clone(),
        });

    users.register(alice(), "pw12").await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "outer before",
            "middle before",
            "inner before",
            "service",
            "inner after",
            "middle after",
            "outer after",
        ]
    );
}

#[tokio::test]
async fn decorators_forward_results_unchanged() {
    let calls = Calls::default();
    let users: Arc<dyn UsersService> = Arc::new(Logging::new(Tracing::new(FakeUsers {
        calls: calls.clone(),
    })));

    let user = users.register(alice(), "pw12").await.unwrap();
    assert_eq!(user.username, "alice");

    let err = users.login("bob@example.com", "pw12").await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    assert_eq!(err.message(), "no user bob@example.com");

    assert_eq!(calls.lock().unwrap().len(), 2);
}
