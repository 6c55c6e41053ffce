use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use unitick_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{EmailService, EvmTicketingContract, PaymentVerificationClient, TicketingContract},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // Installed once for the whole process
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        log::error!("panic at {}: {}", location, info);
    }));
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to load configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(&config.jwt.secret, &config.jwt.audience);

    let contract: Arc<dyn TicketingContract> = Arc::new(
        EvmTicketingContract::new(&config.chain).context("Invalid chain configuration")?,
    );
    let notifier: Arc<dyn PaymentNotifier> = Arc::new(PostPaymentNotifier::new(
        PaymentVerificationClient::new(config.verification.clone()),
        EmailService::new(config.email.clone()),
    ));

    let profile_service = ProfileService::new(pool.clone());
    let wallet_service = WalletService::new(pool.clone(), &config.wallet)
        .context("Invalid wallet configuration")?;
    let token_service = TokenService::new(
        profile_service.clone(),
        wallet_service.clone(),
        contract.clone(),
    );
    let cart_service = CartService::new(pool.clone());
    let settlement_service = SettlementService::new(
        pool.clone(),
        profile_service.clone(),
        wallet_service.clone(),
        cart_service.clone(),
        contract.clone(),
        notifier,
    );
    let diagnostic_service = DiagnosticService::new(
        profile_service,
        wallet_service,
        cart_service.clone(),
        contract,
    );
    let order_service = OrderService::new(pool);

    log::info!(
        "Starting HTTP server at {}:{} (chain {})",
        config.server.host,
        config.server.port,
        config.chain.chain_id
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(settlement_service.clone()))
            .app_data(web::Data::new(diagnostic_service.clone()))
            .app_data(web::Data::new(cart_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::payment_config)
                    .configure(handlers::diagnostic_config)
                    .configure(handlers::token_approval_config)
                    .configure(handlers::wallet_config)
                    .configure(handlers::cart_config)
                    .configure(handlers::order_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
