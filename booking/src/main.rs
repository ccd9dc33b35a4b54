//! Box Office command-line walkthrough.
//!
//! Books the first available seats of the first showtime on the billboard
//! and prints the payment breakdown. The reservation is only submitted with
//! `--confirm`. `--offline` runs against the in-memory backend instead of
//! the REST API.

use anyhow::Context;
use boxoffice_booking::{
    BookingSession, Config, SeatStatus, SessionSettings, Step,
    mocks::{MockBackend, DEMO_DATE},
    seat_map::SeatCell,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SEATS_TO_BOOK: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.logging.filter)
                .unwrap_or_else(|_| "boxoffice_booking=debug,boxoffice_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let confirm = args.iter().any(|a| a == "--confirm");
    let offline = args.iter().any(|a| a == "--offline");

    let session = if offline {
        info!("Using the in-memory backend");
        BookingSession::new(MockBackend::new().environment(), SessionSettings::from(&config))
    } else {
        info!(api = %config.api.base_url, "Using the REST backend");
        BookingSession::from_config(&config).context("building the booking session")?
    };

    let movies = session.movies().await.context("loading the billboard")?;
    println!("=== Cartelera ({} películas) ===", movies.len());
    for movie in &movies {
        println!("  [{}] {} ({}, {})", movie.id, movie.title, movie.duration, movie.rating);
    }

    let Some(movie) = movies.into_iter().next() else {
        warn!("The billboard is empty");
        return Ok(());
    };
    session.select_movie(Some(movie.clone())).await?;

    let mut showtimes = session.showtimes().await.context("loading showtimes")?;
    if showtimes.is_empty() && offline {
        // Demo showtimes are scheduled on a fixed date
        let date = chrono::NaiveDate::parse_from_str(DEMO_DATE, "%Y-%m-%d")?;
        session.select_date(date).await?;
        showtimes = session.showtimes().await?;
    }
    let Some(showtime) = showtimes.into_iter().find(|s| s.available) else {
        warn!(movie = %movie.title, "No showtime available");
        return Ok(());
    };
    println!(
        "\n=== {} · {} {} · {} ({}) ===",
        movie.title, showtime.date, showtime.time, showtime.room, showtime.room_type
    );

    session.select_showtime(Some(showtime)).await?;
    session.set_step(Step::SeatSelection).await?;

    let map = session.seat_map().await.context("no seat map for the showtime")?;
    for row in &map.rows {
        let line: String = row
            .cells
            .iter()
            .map(|cell| match cell {
                SeatCell::Aisle => ' ',
                SeatCell::Seat { status: SeatStatus::Available, .. } => 'o',
                SeatCell::Seat { status: SeatStatus::Occupied, .. } => 'x',
                SeatCell::Seat { status: SeatStatus::Selected, .. } => '*',
            })
            .collect();
        println!("  {} {line}", row.label);
    }

    let free: Vec<String> = map
        .rows
        .iter()
        .flat_map(|row| &row.cells)
        .filter_map(|cell| match cell {
            SeatCell::Seat {
                seat,
                status: SeatStatus::Available,
            } => Some(seat.label()),
            _ => None,
        })
        .take(SEATS_TO_BOOK)
        .collect();
    for label in &free {
        session.toggle_seat(label).await?;
    }

    if !session.continue_from_seats().await? {
        warn!("No seat could be selected");
        return Ok(());
    }
    session.set_step(Step::Payment).await?;

    let state = session.snapshot().await;
    let breakdown = session.price_breakdown().await;
    println!("\n=== Pago ===");
    println!("  Asientos: {}", state.seat_labels().join(", "));
    for line in &state.selected_tickets {
        println!("  {} x{}  {}", line.ticket_type.name, line.quantity, line.line_total());
    }
    println!("  Subtotal:  {}", breakdown.subtotal);
    println!("  Descuento: {}", breakdown.discount);
    println!("  Neto:      {}", breakdown.net);
    println!("  IVA:       {}", breakdown.tax);
    println!("  Total:     {}", breakdown.total);

    if confirm {
        if session.confirm_booking().await {
            let receipt = session.state(|s| s.receipt.clone()).await;
            if let Some(receipt) = receipt {
                println!("\nReserva confirmada: {} ({})", receipt.order_number, receipt.total);
            }
            session.set_step(Step::Receipt).await?;
        } else {
            let error = session.state(|s| s.last_error.clone()).await;
            println!("\nNo se pudo confirmar: {}", error.unwrap_or_default());
        }
    } else {
        println!("\n(pass --confirm to submit the reservation)");
    }

    session.shutdown().await?;
    Ok(())
}
