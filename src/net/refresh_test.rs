use super::*;

fn leader(machine: &RefreshMachine, epoch: u64) -> LeaderGuard<'_> {
    match machine.begin(epoch) {
        Ticket::Leader(guard) => guard,
        _ => panic!("expected to lead the refresh"),
    }
}

#[test]
fn starts_idle_at_epoch_zero() {
    let machine = RefreshMachine::new();
    assert_eq!(machine.state(), RefreshState::Idle);
    assert_eq!(machine.epoch(), 0);
}

#[test]
fn first_caller_leads_and_moves_to_in_flight() {
    let machine = RefreshMachine::new();
    let _guard = leader(&machine, 0);
    assert_eq!(machine.state(), RefreshState::RefreshInFlight);
}

#[test]
fn second_caller_follows_while_in_flight() {
    let machine = RefreshMachine::new();
    let _guard = leader(&machine, 0);
    assert!(matches!(machine.begin(0), Ticket::Follower(_)));
}

#[test]
fn success_advances_epoch_and_returns_to_idle() {
    let machine = RefreshMachine::new();
    leader(&machine, 0).finish(Ok(()));
    assert_eq!(machine.state(), RefreshState::Idle);
    assert_eq!(machine.epoch(), 1);
}

#[test]
fn stale_epoch_skips_refresh() {
    let machine = RefreshMachine::new();
    leader(&machine, 0).finish(Ok(()));
    assert!(matches!(machine.begin(0), Ticket::AlreadyRefreshed));
    assert!(matches!(machine.begin(1), Ticket::Leader(_)));
}

#[test]
fn failure_moves_to_failed_and_refuses() {
    let machine = RefreshMachine::new();
    leader(&machine, 0).finish(Err(ApiError::from_status(401, "/api/Auth/RefreshToken", String::new())));
    assert_eq!(machine.state(), RefreshState::Failed);
    assert_eq!(machine.epoch(), 0);
    assert!(matches!(machine.begin(0), Ticket::Refused));
}

#[test]
fn rearm_leaves_failed() {
    let machine = RefreshMachine::new();
    leader(&machine, 0).finish(Err(ApiError::Network("down".into())));
    machine.rearm();
    assert_eq!(machine.state(), RefreshState::Idle);
    assert!(matches!(machine.begin(0), Ticket::Leader(_)));
}

#[test]
fn rearm_is_noop_while_in_flight() {
    let machine = RefreshMachine::new();
    let _guard = leader(&machine, 0);
    machine.rearm();
    assert_eq!(machine.state(), RefreshState::RefreshInFlight);
}

#[test]
fn dropped_leader_returns_to_idle() {
    let machine = RefreshMachine::new();
    drop(leader(&machine, 0));
    assert_eq!(machine.state(), RefreshState::Idle);
    assert_eq!(machine.epoch(), 0);
}

#[tokio::test]
async fn followers_receive_leader_outcome() {
    let machine = RefreshMachine::new();
    let guard = leader(&machine, 0);
    let Ticket::Follower(rx) = machine.begin(0) else {
        panic!("expected follower");
    };
    let waiter = tokio::spawn(RefreshMachine::wait(rx));
    guard.finish(Err(ApiError::Network("refresh endpoint down".into())));
    assert_eq!(waiter.await.unwrap(), Err(ApiError::Network("refresh endpoint down".into())));
}

#[tokio::test]
async fn followers_see_outcome_sent_before_they_wait() {
    let machine = RefreshMachine::new();
    let guard = leader(&machine, 0);
    let Ticket::Follower(rx) = machine.begin(0) else {
        panic!("expected follower");
    };
    guard.finish(Ok(()));
    assert_eq!(RefreshMachine::wait(rx).await, Ok(()));
}

#[tokio::test]
async fn followers_error_when_leader_is_dropped() {
    let machine = RefreshMachine::new();
    let guard = leader(&machine, 0);
    let Ticket::Follower(rx) = machine.begin(0) else {
        panic!("expected follower");
    };
    drop(guard);
    assert!(matches!(RefreshMachine::wait(rx).await, Err(ApiError::Network(_))));
}
