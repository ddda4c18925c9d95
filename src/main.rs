use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use flight_pos::config::{Command, Config};
use flight_pos::dialogs::{Dialogs, TerminalDialogs};
use flight_pos::models::EntityId;
use flight_pos::routes::{render_nav, Route, NOT_FOUND};
use flight_pos::scope::ViewScope;
use flight_pos::views::{
    BookingDetailView, BookingFormView, BookingListView, FlightListView, SubmitOutcome,
    UserListView,
};
use flight_pos::Services;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    let services = config
        .services()
        .context("failed to build service clients")?;
    let dialogs = TerminalDialogs::new(config.yes);
    debug!(backend = ?config.backend, "client configured");

    let result = match config.command {
        Command::Open { path, search } => {
            open(&services, Route::parse(&path), search.as_deref(), &dialogs).await
        }
        Command::Cancel { booking_id } => {
            let route = Route::BookingDetail(EntityId::from(booking_id.as_str()));
            let mut view = BookingDetailView::new(services.clone(), EntityId::from(booking_id));
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            let outcome = view.cancel(&dialogs).await;
            info!(?outcome, "cancel finished");
            interrupt.abort();
            print_screen(&route, &view.render());
            Ok(())
        }
        Command::DeleteFlight { flight_id } => {
            let mut view = FlightListView::new(services.clone());
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            let outcome = view.delete(&EntityId::from(flight_id), &dialogs).await;
            info!(?outcome, "delete finished");
            interrupt.abort();
            print_screen(&Route::Home, &view.render());
            Ok(())
        }
        Command::Book {
            flight_id,
            name,
            email,
            tickets,
        } => {
            let route = Route::BookFlight(EntityId::from(flight_id.as_str()));
            let mut view = BookingFormView::new(services.clone(), EntityId::from(flight_id));
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            view.set_passenger_name(&name);
            view.set_passenger_email(&email);
            view.set_ticket_quantity(tickets);
            print_screen(&route, &view.render());

            let outcome = view.submit(&dialogs).await;
            interrupt.abort();
            match outcome {
                SubmitOutcome::Navigate(next) => open(&services, next, None, &dialogs).await,
                SubmitOutcome::Stay => Ok(()),
            }
        }
    };

    services.log_stats();
    result
}

// Loads and prints the view behind `route`
async fn open(
    services: &Services,
    route: Route,
    search: Option<&str>,
    dialogs: &dyn Dialogs,
) -> Result<()> {
    let search = search.unwrap_or_default();
    let body = match &route {
        Route::Home => {
            let mut view = FlightListView::new(services.clone());
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            interrupt.abort();
            view.set_search(search);
            view.render()
        }
        Route::BookFlight(flight_id) => {
            let mut view = BookingFormView::new(services.clone(), flight_id.clone());
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            interrupt.abort();
            view.render()
        }
        Route::Bookings => {
            let mut view = BookingListView::new(services.clone());
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            interrupt.abort();
            view.set_search(search);
            view.render()
        }
        Route::BookingDetail(booking_id) => {
            let mut view = BookingDetailView::new(services.clone(), booking_id.clone());
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            interrupt.abort();
            view.render()
        }
        Route::Users => {
            let mut view = UserListView::new(services.clone());
            let interrupt = teardown_on_interrupt(view.scope());
            view.load().await;
            interrupt.abort();
            view.set_search(search);
            view.render()
        }
        Route::NotFound(path) => {
            dialogs.alert(&format!("{}: {}", NOT_FOUND, path));
            String::new()
        }
    };

    print_screen(&route, &body);
    Ok(())
}

// Ctrl-C tears down the active view; its pending fetches resolve as discarded
fn teardown_on_interrupt(scope: &ViewScope) -> JoinHandle<()> {
    let scope = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, tearing down view");
            scope.teardown();
        }
    })
}

fn print_screen(route: &Route, body: &str) {
    println!("{}", render_nav(route));
    println!();
    print!("{}", body);
}
