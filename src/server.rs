use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::service::{Book, CollectionService, Word};
use crate::store::RecordStore;

pub mod error;
pub mod routes;

use routes::{book_routes, word_routes};

/// HTTP server owning one collection per resource type
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    books: CollectionService<Book>,
    words: CollectionService<Word>,
}

/// Build the application router over the given collections
pub fn router(books: CollectionService<Book>, words: CollectionService<Word>) -> Router {
    Router::new()
        .nest("/books", book_routes(books))
        .nest("/words", word_routes(words))
        .layer(TraceLayer::new_for_http())
}

impl Server {
    /// Create and bind the server to the specified address
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        // Stores live as long as the process and are only reachable through their services
        let books = CollectionService::new(Arc::new(RecordStore::new()));
        let words = CollectionService::new(Arc::new(RecordStore::new()));

        Ok(Self {
            listener,
            local_addr,
            books,
            words,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until ctrl-c is received
    pub async fn run(self) -> std::io::Result<()> {
        info!("Server started, listening on {}", self.local_addr);
        let app = router(self.books, self.words);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
