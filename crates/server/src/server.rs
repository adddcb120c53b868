use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{ServerError, analytics, auth, entities, incomes, users};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Bearer-token middleware for the protected surface.
///
/// Validates the token, loads the claimed user from the store (rejecting
/// unknown or deactivated accounts) and hands the model to the handlers as a
/// request extension. Requests without a usable `Authorization` header are
/// rejected outright.
async fn bearer_auth(
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(bearer)) = bearer else {
        return Err(ServerError::from(EngineError::InvalidToken));
    };

    let user = state.engine.authenticate_token(bearer.token()).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Build the application router around the given engine.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let protected = Router::new()
        .route("/users", get(users::list))
        .route("/users/{id}", patch(users::update).delete(users::remove))
        .route("/entities", get(entities::list).post(entities::create))
        .route("/incomes", get(incomes::list).post(incomes::create))
        .route("/incomes/{id}", patch(incomes::update).delete(incomes::remove))
        .route("/analytics", get(analytics::report))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth));

    // Login and registration are the only routes reachable without a token.
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
