//! Property tests for the booking reducer's selection rules.

#![allow(clippy::unwrap_used)]

use boxoffice_booking::mocks::{self, MockBackend};
use boxoffice_booking::{
    BookingAction, BookingEnvironment, BookingReducer, BookingState, Discount, Money, Promotion,
    PromotionId, SeatKind, SeatSelection, Step, TicketLine, User,
};
use boxoffice_core::reducer::Reducer;
use boxoffice_testing::test_clock;
use proptest::prelude::*;
use std::sync::Arc;

const STEPS: [Step; 13] = [
    Step::Catalog,
    Step::MovieDetail,
    Step::SeatSelection,
    Step::TicketSelection,
    Step::SnackUpsell,
    Step::Payment,
    Step::Receipt,
    Step::CandyCounter,
    Step::Perks,
    Step::Promotions,
    Step::Profile,
    Step::Login,
    Step::Register,
];

fn env() -> BookingEnvironment {
    MockBackend::new().with_clock(Arc::new(test_clock())).environment()
}

fn apply(state: &mut BookingState, action: BookingAction, env: &BookingEnvironment) {
    let _ = BookingReducer::new().reduce(state, action, env);
}

fn seat_strategy() -> impl Strategy<Value = SeatSelection> {
    (prop::sample::select(vec!["A", "B", "C", "D"]), 1u32..6, 100u64..2000)
        .prop_map(|(row, number, cents)| SeatSelection::new(row, number, SeatKind::Normal, Money::from_cents(cents)))
}

/// Cart additions that can only grow the total
fn addition_strategy() -> impl Strategy<Value = BookingAction> {
    prop_oneof![
        (prop::sample::select(vec!["general", "nino", "vip"]), 1i32..5, 100u64..2000).prop_map(
            |(id, quantity, cents)| BookingAction::UpsertTicket {
                ticket_type: mocks::ticket_type(id, id, cents),
                quantity,
            }
        ),
        (prop::sample::select(vec!["popcorn", "soda", "combo"]), 100u64..1500)
            .prop_map(|(id, cents)| BookingAction::AddSnack(mocks::snack(id, id, cents))),
    ]
}

fn promotion_strategy() -> impl Strategy<Value = Option<Promotion>> {
    prop_oneof![
        Just(None),
        (0u8..=100).prop_map(|p| Some(Discount::Percentage(p))),
        (0u64..3000).prop_map(|c| Some(Discount::Fixed(Money::from_cents(c)))),
    ]
    .prop_map(|discount| {
        discount.map(|discount| Promotion {
            id: PromotionId::new(1),
            title: "promo".into(),
            description: String::new(),
            image: String::new(),
            discount: Some(discount),
            code: None,
        })
    })
}

proptest! {
    #[test]
    fn seats_stay_unique(seats in prop::collection::vec(seat_strategy(), 0..30)) {
        let env = env();
        let mut state = BookingState::default();
        for seat in seats {
            apply(&mut state, BookingAction::AddSeat(seat.clone()), &env);
            apply(&mut state, BookingAction::AddSeat(seat), &env);
        }

        let mut ids: Vec<_> = state.selected_seats.iter().map(|s| s.id.clone()).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), count);
    }

    #[test]
    fn removing_an_absent_seat_changes_nothing(
        seats in prop::collection::vec(seat_strategy(), 0..10),
        number in 50u32..99,
    ) {
        let env = env();
        let mut state = BookingState::default();
        for seat in seats {
            apply(&mut state, BookingAction::AddSeat(seat), &env);
        }
        let before = state.clone();

        apply(&mut state, BookingAction::RemoveSeat(format!("Z{number}").as_str().into()), &env);

        prop_assert_eq!(state, before);
    }

    #[test]
    fn non_positive_quantity_removes_ticket_line(quantity in -10i32..=0, initial in 1u32..10) {
        let env = env();
        let mut state = BookingState::default();
        apply(&mut state, BookingAction::SetTickets(vec![TicketLine {
            ticket_type: mocks::ticket_type("general", "General", 850),
            quantity: initial,
        }]), &env);

        apply(&mut state, BookingAction::UpdateTicketQuantity {
            ticket_type_id: "general".into(),
            quantity,
        }, &env);

        prop_assert!(state.selected_tickets.is_empty());
        prop_assert!(state.selected_tickets.iter().all(|line| line.quantity > 0));
    }

    #[test]
    fn total_never_drops_while_adding(
        promotion in promotion_strategy(),
        additions in prop::collection::vec(addition_strategy(), 1..20),
    ) {
        let env = env();
        let mut state = BookingState::default();
        apply(&mut state, BookingAction::SetPromotion(promotion), &env);

        let mut previous = state.total();
        for action in additions {
            // Upserts may lower an existing line's quantity; only count growth
            if let BookingAction::UpsertTicket { ticket_type, quantity } = &action {
                let existing = state
                    .selected_tickets
                    .iter()
                    .find(|line| line.ticket_type.id == ticket_type.id)
                    .map(|line| (line.quantity, line.ticket_type.price));
                if existing.is_some_and(|(q, price)| i64::from(q) > i64::from(*quantity) || price > ticket_type.price) {
                    continue;
                }
            }
            apply(&mut state, action, &env);
            let total = state.total();
            prop_assert!(total >= previous, "{} < {}", total, previous);
            previous = total;
        }

        let snack_ids: Vec<_> = state.selected_snacks.iter().map(|l| l.snack.id.clone()).collect();
        let ticket_ids: Vec<_> = state.selected_tickets.iter().map(|l| l.ticket_type.id.clone()).collect();
        let removals = snack_ids
            .into_iter()
            .map(BookingAction::RemoveSnack)
            .chain(ticket_ids.into_iter().map(|ticket_type_id| BookingAction::UpdateTicketQuantity {
                ticket_type_id,
                quantity: 0,
            }));
        for action in removals {
            apply(&mut state, action, &env);
            let total = state.total();
            prop_assert!(total <= previous, "{} > {}", total, previous);
            previous = total;
        }
        prop_assert!(state.selected_tickets.is_empty());
        prop_assert!(state.total().is_zero());
    }

    #[test]
    fn reset_preserves_location_and_user(
        city in "[a-z]{3,12}",
        cinema in "[a-z]{3,12}",
        logged_in in any::<bool>(),
        seats in prop::collection::vec(seat_strategy(), 0..5),
        step_index in 0usize..STEPS.len(),
    ) {
        let env = env();
        let user: Option<User> = logged_in.then(|| mocks::user(1, "Ana"));
        let mut state = BookingState::default();
        apply(&mut state, BookingAction::SetCity(city.clone()), &env);
        apply(&mut state, BookingAction::SetCinema(cinema.clone()), &env);
        state.user = user.clone();
        for seat in seats {
            apply(&mut state, BookingAction::AddSeat(seat), &env);
        }
        apply(&mut state, BookingAction::AddSnack(mocks::snack("popcorn", "Canguil", 600)), &env);
        apply(&mut state, BookingAction::SetStep(STEPS[step_index]), &env);

        apply(&mut state, BookingAction::ResetBooking, &env);

        let today = test_clock_today();
        prop_assert_eq!(state, BookingState::new(today, city, cinema, user));
    }

    #[test]
    fn any_step_can_be_set(from in 0usize..STEPS.len(), to in 0usize..STEPS.len()) {
        let env = env();
        let mut state = BookingState::default();
        apply(&mut state, BookingAction::SetStep(STEPS[from]), &env);
        apply(&mut state, BookingAction::SetStep(STEPS[to]), &env);
        prop_assert_eq!(state.step, STEPS[to]);
    }
}

fn test_clock_today() -> chrono::NaiveDate {
    use boxoffice_core::environment::Clock;
    test_clock().now().date_naive()
}
