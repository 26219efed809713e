use std::future::Future;

use axum::extract::Request;
use axum::middleware::{Next, from_fn, from_fn_with_state};
use axum::response::Response;
use axum::Router;
use tokio::signal;

use crate::paths::{LocalizedPaths, ServerConfig, localize_paths};

type Middleware = Box<dyn FnOnce(Router) -> Router + Send>;

pub struct WebServer {
    router: Router,
    addr: String,
    middlewares: Vec<Middleware>,
    localized: Option<LocalizedPaths>,
}

impl WebServer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            router: Router::new(),
            addr: addr.into(),
            middlewares: Vec::new(),
            localized: None,
        }
    }

    /// 使用配置创建；`locale_prefix` 会覆盖 `paths` 上的同名设置
    pub fn from_config(config: &ServerConfig, paths: LocalizedPaths) -> Self {
        Self::new(config.addr.clone())
            .layer_localized_paths(paths.locale_prefix(config.locale_prefix))
    }

    /// 启用多语言路径改写
    ///
    /// 改写必须发生在路由匹配之前，因此该中间件包在整个路由外层，
    /// 而不是像 [`layer_fn`](Self::layer_fn) 那样挂在各个路由上。
    pub fn layer_localized_paths(mut self, paths: LocalizedPaths) -> Self {
        self.localized = Some(paths);
        self
    }

    pub fn layer_fn<F, Fut>(mut self, f: F) -> Self
    where
        F: Clone + Send + Sync + 'static + Fn(Request, Next) -> Fut,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.middlewares.push(Box::new(|r| r.layer(from_fn(f))));
        self
    }

    pub fn mount(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// 应用所有中间件并返回最终路由，中间件在挂载路由之后才生效
    pub fn into_router(self) -> Router {
        let mut router = self.router;
        for m in self.middlewares {
            router = m(router);
        }

        match self.localized {
            Some(paths) => Router::new()
                .fallback_service(router)
                .layer(from_fn_with_state(paths, localize_paths)),
            None => router,
        }
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let addr = self.addr.clone();
        log::info!("🚀 Starting web server at {}", addr);

        let router = self.into_router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        // 优雅关闭处理
        let server = axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown());
        if let Err(e) = server.await {
            log::error!("Server error: {}", e);
            return Err(anyhow::anyhow!("Server error: {}", e));
        }

        log::info!("🛑 Server stopped");
        Ok(())
    }
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            log::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::current_locale;
    use axum::{body::Body, routing::get};
    use http::Request;
    use locus_core::PathTranslator;
    use tower::util::ServiceExt;

    async fn check_locale() -> String {
        current_locale().map(|l| l.to_string()).unwrap_or_else(|| "not set".to_string())
    }

    async fn body_of(router: Router, uri: &str) -> String {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = ServiceExt::oneshot(router, req).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_layer_then_mount() {
        let router = WebServer::new("0.0.0.0:0")
            .layer_localized_paths(LocalizedPaths::new(PathTranslator::builtin()))
            .mount(Router::new().route("/categories", get(check_locale)))
            .into_router();

        assert_eq!(body_of(router, "/nl/categorieen").await, "nl");
    }

    #[tokio::test]
    async fn test_without_localized_paths() {
        let router = WebServer::new("0.0.0.0:0")
            .mount(Router::new().route("/categories", get(check_locale)))
            .into_router();

        assert_eq!(body_of(router, "/categories").await, "not set");
    }

    #[tokio::test]
    async fn test_from_config_disables_prefix() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            locale_prefix: false,
        };
        let server = WebServer::from_config(&config, LocalizedPaths::new(PathTranslator::builtin()))
            .mount(Router::new().route("/categories", get(check_locale)));
        assert_eq!(server.addr(), "127.0.0.1:0");

        let router = server.into_router();
        // 无前缀时由 slug 推断语言
        assert_eq!(body_of(router.clone(), "/categorias").await, "pt");
        assert_eq!(body_of(router.clone(), "/categories").await, "en");

        let req = Request::builder().uri("/pt/categorias").body(Body::empty()).unwrap();
        let response = ServiceExt::oneshot(router, req).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }
}
