use roulette_ledger::{
    errors::WagerError,
    game_store::{load_snapshot, save_snapshot},
    games::{
        Address, Amount, BetCategory, RandomWord, RandomnessOracle, RawSelector, Selector,
        VrfOracle, WagerController, WagerEvent, WagerSettings,
    },
};

const STAKE: Amount = 1_000_000_000_000_000;

fn owner() -> Address {
    Address::from_label("owner")
}

fn oracle() -> Address {
    Address::from_label("oracle")
}

fn player() -> Address {
    Address::from_label("player")
}

fn new_controller() -> WagerController {
    WagerController::new(WagerSettings::default(), owner(), oracle())
}

/// Place a bet and settle it with a word that reduces to `outcome`
fn settle_with(controller: &mut WagerController, selectors: &[RawSelector], outcome: u64) -> u64 {
    let bet_id = controller
        .place_bet(player(), selectors, STAKE * selectors.len() as Amount)
        .unwrap();
    let request_id = controller.bet_info(bet_id).unwrap().request_id;
    controller
        .receive_randomness(oracle(), request_id, &[RandomWord::from(outcome)])
        .unwrap();
    bet_id
}

#[test]
fn test_constructor_exposes_payout_table() {
    let controller = new_controller();
    let table = controller.payout_table();

    let payouts: Vec<u64> = BetCategory::ALL.iter().map(|c| table.multiplier(*c)).collect();
    let ranges: Vec<u8> = BetCategory::ALL.iter().map(|c| table.number_range(*c)).collect();
    assert_eq!(payouts, vec![2, 3, 3, 2, 2, 36]);
    assert_eq!(ranges, vec![1, 2, 2, 1, 1, 36]);
    assert_eq!(controller.bet_amount(), STAKE);
    assert_eq!(controller.last_bet_id(), 0);
}

#[test]
fn test_bet_is_recorded_with_request() {
    let mut controller = new_controller();
    let selectors = [RawSelector::new(0, 1), RawSelector::new(5, 12)];
    let bet_id = controller.place_bet(player(), &selectors, 2 * STAKE).unwrap();

    assert_eq!(bet_id, 1);
    assert_eq!(controller.last_bet_id(), 1);
    assert_eq!(controller.player_bet_ids(&player()), &[1]);
    assert_eq!(controller.player_bet_at(&player(), 0), Some(1));

    let bet = controller.bet_info(1).unwrap();
    assert_eq!(bet.player, player());
    assert_eq!(bet.bet_amount, STAKE);
    assert_eq!(
        bet.selectors,
        vec![
            Selector::new(BetCategory::Color, 1),
            Selector::new(BetCategory::Straight, 12)
        ]
    );
    assert!(!bet.is_settled);
    assert!(!bet.is_claimed);
    assert_eq!(bet.reward_amount, 0);

    match &controller.events()[0] {
        WagerEvent::BetPlaced { bet_id, request_id, player: p, .. } => {
            assert_eq!(*bet_id, 1);
            assert_eq!(*request_id, bet.request_id);
            assert_eq!(*p, player());
        }
        other => panic!("Expected BetPlaced, got {:?}", other),
    }
}

#[test]
fn test_fulfilment_event_carries_reduced_word() {
    let mut controller = new_controller();
    controller.place_bet(player(), &[RawSelector::new(3, 0)], STAKE).unwrap();
    let request_id = controller.bet_info(1).unwrap().request_id;

    controller
        .receive_randomness(oracle(), request_id, &[RandomWord::from(12345u64)])
        .unwrap();

    assert_eq!(
        controller.events().last(),
        Some(&WagerEvent::RandomnessFulfilled { request_id, bet_id: 1, outcome: (12345 % 37) as u8 })
    );
}

#[test]
fn test_scenario_a_parity_even_wins_on_ten() {
    let mut controller = new_controller();
    let bet_id = settle_with(&mut controller, &[RawSelector::new(4, 0)], 10);

    let bet = controller.bet_info(bet_id).unwrap();
    assert!(bet.is_settled);
    assert_eq!(bet.outcome, Some(10));
    assert_eq!(bet.reward_amount, 2 * STAKE);
}

#[test]
fn test_scenario_b_parity_even_loses_on_eleven() {
    let mut controller = new_controller();
    let bet_id = settle_with(&mut controller, &[RawSelector::new(4, 0)], 11);

    let bet = controller.bet_info(bet_id).unwrap();
    assert!(bet.is_settled);
    assert_eq!(bet.reward_amount, 0);
}

#[test]
fn test_scenario_c_red_and_odd_on_three() {
    let mut controller = new_controller();
    let selectors = [RawSelector::new(0, 0), RawSelector::new(4, 1)];
    let bet_id = settle_with(&mut controller, &selectors, 3);

    assert_eq!(controller.bet_info(bet_id).unwrap().reward_amount, 4 * STAKE);
}

#[test]
fn test_scenario_d_claim_preconditions() {
    let mut controller = new_controller();

    // Unsettled
    let pending = controller.place_bet(player(), &[RawSelector::new(4, 0)], STAKE).unwrap();
    assert_eq!(controller.claim(player(), &[pending]), Err(WagerError::NotSettled(pending)));

    // Settled without a reward
    let request_id = controller.bet_info(pending).unwrap().request_id;
    controller
        .receive_randomness(oracle(), request_id, &[RandomWord::from(11u64)])
        .unwrap();
    assert_eq!(controller.claim(player(), &[pending]), Err(WagerError::NothingToClaim(pending)));

    // Straight win of 36x against a pool holding only the two stakes
    let winner = settle_with(&mut controller, &[RawSelector::new(5, 7)], 7);
    let reward = controller.bet_info(winner).unwrap().reward_amount;
    assert_eq!(reward, 36 * STAKE);
    assert_eq!(controller.balance(), 2 * STAKE);

    let err = controller.claim(player(), &[winner]).unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
    assert!(err.is_retryable());
    assert!(!controller.bet_info(winner).unwrap().is_claimed);

    controller.fund(owner(), 40 * STAKE).unwrap();
    let before = controller.balance();
    assert_eq!(controller.claim(player(), &[winner]), Ok(reward));
    assert_eq!(controller.balance(), before - reward);
    assert!(controller.bet_info(winner).unwrap().is_claimed);
    assert_eq!(
        controller.events().last(),
        Some(&WagerEvent::RewardClaimed { player: player(), bet_id: winner, amount: reward })
    );
}

#[test]
fn test_scenario_e_replayed_callback_rejected() {
    let mut controller = new_controller();
    let bet_id = settle_with(&mut controller, &[RawSelector::new(5, 10)], 10);
    let request_id = controller.bet_info(bet_id).unwrap().request_id;
    let settled = controller.bet_info(bet_id).unwrap().clone();

    let replay = controller.receive_randomness(oracle(), request_id, &[RandomWord::from(20u64)]);
    assert_eq!(replay, Err(WagerError::UnknownOrResolvedRequest(request_id)));
    assert_eq!(controller.bet_info(bet_id), Some(&settled));
}

#[test]
fn test_claim_by_non_owner_rejected() {
    let mut controller = new_controller();
    let bet_id = settle_with(&mut controller, &[RawSelector::new(4, 0)], 10);

    let stranger = Address::from_label("stranger");
    assert_eq!(
        controller.claim(stranger, &[bet_id]),
        Err(WagerError::NotOwner { bet_id, caller: stranger })
    );
    assert_eq!(controller.claim(player(), &[99]), Err(WagerError::UnknownBet(99)));
    assert_eq!(controller.claim(player(), &[]), Err(WagerError::EmptyClaim));
}

#[test]
fn test_vrf_oracle_drives_settlement() {
    let vrf = VrfOracle::from_seed(&[9u8; 32]).unwrap();
    let mut controller = WagerController::new(WagerSettings::default(), owner(), vrf.address());

    controller.place_bet(player(), &[RawSelector::new(2, 0)], STAKE).unwrap();
    controller.place_bet(player(), &[RawSelector::new(5, 0)], STAKE).unwrap();
    assert_eq!(controller.pending_requests().len(), 2);

    let reports = controller.fulfil_pending(&vrf).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(controller.pending_requests().is_empty());
    for report in reports {
        let bet = controller.bet_info(report.bet_id).unwrap();
        assert!(bet.is_settled);
        assert_eq!(bet.outcome, Some(report.outcome));
        assert!(report.outcome < 37);
    }
}

#[test]
fn test_snapshot_round_trip_preserves_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut controller = new_controller();
    controller.fund(owner(), 10 * STAKE).unwrap();
    let winner = settle_with(&mut controller, &[RawSelector::new(4, 0)], 10);
    let open = controller.place_bet(player(), &[RawSelector::new(1, 2)], STAKE).unwrap();
    save_snapshot(&path, &controller).unwrap();

    let mut restored = load_snapshot(&path).unwrap().expect("snapshot should exist");
    assert_eq!(restored.balance(), controller.balance());
    assert_eq!(restored.last_bet_id(), 2);
    assert_eq!(restored.events(), controller.events());
    assert_eq!(restored.payout_table().multiplier(BetCategory::Straight), 36);

    // Open request still answerable, settled one still claimable after reload
    let request_id = restored.bet_info(open).unwrap().request_id;
    restored
        .receive_randomness(oracle(), request_id, &[RandomWord::from(3u64)])
        .unwrap();
    assert_eq!(restored.claim(player(), &[winner]), Ok(2 * STAKE));
}

#[test]
fn test_snapshot_reloads_amounts_beyond_u64() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    // 20 ether in wei
    let deposit: Amount = 20_000_000_000_000_000_000;
    assert!(deposit > u64::MAX as Amount);

    let mut controller = new_controller();
    controller.fund(owner(), deposit).unwrap();
    let winner = settle_with(&mut controller, &[RawSelector::new(5, 7)], 7);
    controller.claim(player(), &[winner]).unwrap();
    save_snapshot(&path, &controller).unwrap();

    let restored = load_snapshot(&path).unwrap().expect("snapshot should exist");
    assert_eq!(restored.balance(), deposit + STAKE - 36 * STAKE);
    assert_eq!(restored.events(), controller.events());
    assert_eq!(
        restored.events()[0],
        WagerEvent::Funded { from: owner(), amount: deposit }
    );
}

#[test]
fn test_any_stake_other_than_exact_is_rejected() {
    let mut controller = new_controller();
    controller.fund(owner(), 5 * STAKE).unwrap();
    let events_before = controller.events().to_vec();
    let two = [RawSelector::new(0, 0), RawSelector::new(4, 1)];

    for attached in [0, STAKE, 2 * STAKE - 1, 2 * STAKE + 1] {
        assert_eq!(
            controller.place_bet(player(), &two, attached),
            Err(WagerError::StakeMismatch { expected: 2 * STAKE, attached })
        );
    }
    assert_eq!(
        controller.place_bet(player(), &[RawSelector::new(3, 1)], 0),
        Err(WagerError::StakeMismatch { expected: STAKE, attached: 0 })
    );

    assert_eq!(controller.last_bet_id(), 0);
    assert_eq!(controller.balance(), 5 * STAKE);
    assert!(controller.player_bet_ids(&player()).is_empty());
    assert!(controller.pending_requests().is_empty());
    assert_eq!(controller.events(), events_before.as_slice());

    assert_eq!(controller.place_bet(player(), &two, 2 * STAKE), Ok(1));
}
