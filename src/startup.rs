use actix_web::dev::Server;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::Settings;
use crate::routes::{fallback, handle_create_subscription};
use crate::store::SubscriberStore;

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let store = SubscriberStore::new(&config.store);
        store.ensure_initialized().await.map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to initialize the subscriber store: {}", err),
            )
        })?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, store, config.get_allowed_origin())?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: SubscriberStore,
    allowed_origin: String,
) -> Result<Server, std::io::Error> {
    // A single store instance shared by every worker, its mutex serializes the writes
    let store = web::Data::new(store);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .wrap(cors_headers(&allowed_origin))
            .service(
                web::resource("/subscribe")
                    .route(web::post().to(handle_create_subscription))
                    .default_service(web::to(fallback)),
            )
            .default_service(web::to(fallback))
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

fn cors_headers(allowed_origin: &str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", allowed_origin.to_string()))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}
