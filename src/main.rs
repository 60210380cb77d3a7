#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use axum::{Router, middleware};
    use leptos::logging::log;
    use leptos::prelude::*;
    use leptos_axum::{LeptosRoutes, generate_route_list};
    use shopfront::app::*;
    use shopfront::core::auth::{AuthService, JwtService, protect_routes};
    use shopfront::core::catalog::ProductTypeRegistry;
    use shopfront::core::config::Config;
    use shopfront::core::db::{AdminRepository, create_pool_with_migrations};
    use shopfront::core::state::{AppState, api_router};
    use tower_http::compression::{CompressionLayer, CompressionLevel};
    use tower_http::services::ServeDir;
    use tracing_subscriber::EnvFilter;

    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        issuer = %config.jwt.issuer,
        access_minutes = config.jwt.access_token_expiration_minutes,
        refresh_days = config.jwt.refresh_token_expiration_days,
        secure_cookies = config.cookies.secure,
        "Config loaded"
    );

    let pool = match create_pool_with_migrations(&config.db).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize database");
            std::process::exit(1);
        }
    };

    let jwt = JwtService::new(config.jwt.clone());
    let auth = AuthService::new(Arc::new(AdminRepository::new(pool)), jwt.clone());

    if let Some(bootstrap) = &config.bootstrap {
        if let Err(e) = auth
            .bootstrap_super_admin(&bootstrap.email, &bootstrap.password)
            .await
        {
            tracing::error!(error = %e, "Failed to bootstrap super admin");
            std::process::exit(1);
        }
    }

    let registry = match &config.product_types_path {
        Some(path) => ProductTypeRegistry::from_path(path),
        None => ProductTypeRegistry::builtin(),
    };
    let registry = match registry {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load product types");
            std::process::exit(1);
        }
    };
    tracing::info!(product_types = registry.schemas().len(), "Product types loaded");

    let state = AppState::new(auth, config.cookies, registry);

    // Load configuration from Cargo.toml [package.metadata.leptos]
    // Can be overridden via LEPTOS_SITE_ADDR env var for Docker/K8s
    let conf = match get_configuration(None) {
        Ok(conf) => conf,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read Leptos configuration");
            std::process::exit(1);
        }
    };
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let routes = generate_route_list(App);

    // Serves .br and .gz variants when present
    let pkg_service = ServeDir::new(format!("{}/pkg", leptos_options.site_root))
        .precompressed_br()
        .precompressed_gzip();

    // Dashboard pages need a verified token; the login page stays public
    let leptos_router = Router::new()
        .nest_service("/pkg", pkg_service)
        .leptos_routes(&leptos_options, routes, {
            let leptos_options = leptos_options.clone();
            move || shell(leptos_options.clone())
        })
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options)
        .layer(middleware::from_fn_with_state(jwt, protect_routes));

    let app = Router::new()
        .merge(api_router(state))
        .merge(leptos_router)
        .layer(
            CompressionLayer::new()
                .br(true)
                .gzip(true)
                .quality(CompressionLevel::Best),
        );

    log!("listening on http://{}", &addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!(error = %e, "Server error");
    }
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}
