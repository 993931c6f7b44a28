//! Integration test: Create -> Validate -> Snapshot -> Fight -> Rest -> Level up
//!
//! Drives a character through a whole session the way a hosting application
//! would, using only the public API.

use ascendant_core::character::{AttackProfile, Creature, Equipment, WeaponProfile};
use ascendant_core::combat::{CombatEncounter, Participant, Side};
use ascendant_core::prelude::*;
use ascendant_core::spell::EffectOutcome;
use ascendant_core::Character;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

fn print_character(c: &Character) {
    println!("  {} (level {} {})", c.name, c.level, c.class_id);
    println!(
        "    HP: {}/{} (+{} temp)",
        c.hit_points.current, c.hit_points.max, c.hit_points.temporary
    );
    println!("    AC: {}  Speed: {}", c.armor_class, c.speed);
    println!(
        "    Favor: {}/{}  Monarch: {}",
        c.resources.favor,
        c.favor_max(),
        c.resources.monarch_active
    );
    println!("    Slots: {:?}", &c.resources.spell_slots[1..]);
}

fn goblin(id: &str, distance: u32) -> Participant {
    let creature = Creature::new(id, "Goblin", 13, 7).with_attack(AttackProfile {
        name: "Scimitar".to_string(),
        attack_bonus: 4,
        damage: DiceExpr::parse("1d6").unwrap(),
        damage_type: DamageType::Slashing,
        damage_bonus: 2,
        reach_feet: 5,
    });
    Participant::from_creature(&creature, Side::Enemy, distance)
}

fn assert_invariants(c: &Character) {
    let hp = c.hit_points;
    assert!(hp.current >= 0, "negative hit points: {:?}", hp);
    assert!(hp.current <= hp.max, "hit points above max: {:?}", hp);
    assert!(hp.temporary >= 0);
    assert!(c.resources.favor <= c.favor_max());
}

#[test]
fn test_full_monarch_session() {
    separator("STEP 1: Create and validate");

    let catalog = default_classes();
    let factory = CharacterFactory::new(&catalog);
    let options = CharacterOptions::new("Sung Jinwoo", "shadow_monarch")
        .with_abilities(AbilityScores {
            strength: 12,
            agility: 14,
            vitality: 14,
            intelligence: 16,
            perception: 10,
            presence: 12,
        })
        .with_skills([Skill::Arcana, Skill::Awareness])
        .with_monarch_power(true);

    let report = factory.validate(&options);
    println!("  Valid: {}  Messages: {:?}", report.valid, report.messages());
    assert!(report.valid);
    assert!(report.warnings.is_empty());

    let character = factory.build(&options);
    print_character(&character);
    // d8 + 2
    assert_eq!(character.hit_points.max, 10);
    assert!(character.resources.monarch_active);
    assert_eq!(character.resources.slots_at(1), 2);

    separator("STEP 2: Snapshot round trip");

    let json = character.to_snapshot_json().unwrap();
    let restored = Character::from_snapshot_json(&json).unwrap();
    assert_eq!(restored, character);

    separator("STEP 3: Combat");

    let mut session = SessionController::new(restored);
    session.learn_power("rulers_authority").unwrap();
    session.learn_power("fire_bolt").unwrap();

    // Goblin rolls 5, player 14 + 2
    let mut roller = ScriptedRoller::new([5, 14]);
    let early = session
        .start_combat(CombatEncounter::new(vec![goblin("goblin", 30)]), &mut roller)
        .unwrap();
    assert!(early.is_empty());
    assert!(session.combat_state().unwrap().is_turn);

    // 2d8 = 11 force, goblin fails its strength save with a 4 against DC 13
    let mut roller = ScriptedRoller::new([6, 5, 4]);
    let spell = session
        .cast_spell("rulers_authority", Some("goblin"), None, &mut roller)
        .unwrap();
    println!("  Cast: {:?}", spell.cast);
    assert_eq!(spell.cast.save_dc, Some(13));
    assert_eq!(spell.cast.monarch_spent, 1);
    assert!(!spell.save.as_ref().unwrap().success);
    assert!(matches!(spell.cast.effect, Some(EffectOutcome::Damage { .. })));
    assert_eq!(spell.mitigated.unwrap().final_amount, 11);
    assert_eq!(spell.target_hit_points, Some(0));

    let state = session.combat_state().unwrap();
    assert!(state.monarch_used_this_turn);
    assert_eq!(state.actions_taken, 1);
    assert_eq!(session.character().resources.favor, 2);
    assert_eq!(session.character().resources.slots_at(1), 1);

    let err = session
        .cast_spell("fire_bolt", Some("goblin"), None, &mut ScriptedRoller::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "action already used this turn");

    let encounter = session.end_combat().unwrap();
    assert!(encounter.is_resolved());

    separator("STEP 4: Rest and level up");

    session.short_rest().unwrap();
    assert_eq!(session.character().resources.favor, 3);
    assert_eq!(session.character().resources.slots_at(1), 1);

    session.long_rest().unwrap();
    assert_eq!(session.character().resources.slots_at(1), 2);

    session.level_up().unwrap();
    session.level_up().unwrap();
    print_character(session.character());
    assert_eq!(session.character().level, 3);
    assert_eq!(session.character().resources.slots_at(1), 4);
    assert_eq!(session.character().resources.slots_at(2), 2);
    assert_eq!(session.character().proficiency_bonus(), 2);

    let template = session.character().to_template();
    assert_eq!(template.class_id, "shadow_monarch");
    assert_eq!(template.level, 3);
}

fn skirmish(seed: u64) -> (Character, CombatEncounter) {
    let sword = Equipment::weapon(
        "sword",
        "Longsword",
        WeaponProfile {
            damage: DiceExpr::parse("1d8").unwrap(),
            damage_type: DamageType::Slashing,
            kind: AttackKind::Melee,
            reach_feet: 5,
        },
    )
    .equipped();

    let catalog = default_classes();
    let character = CharacterFactory::new(&catalog)
        .build(&CharacterOptions::new("Yoo Jinho", "fighter").with_abilities(AbilityScores::uniform(14)))
        .with_item(sword);

    let mut roller = RngRoller::new(ChaCha8Rng::seed_from_u64(seed));
    let mut session = SessionController::new(character);
    session
        .start_combat(
            CombatEncounter::new(vec![goblin("goblin_a", 20), goblin("goblin_b", 25)]),
            &mut roller,
        )
        .unwrap();
    assert_invariants(session.character());

    for _ in 0..30 {
        let encounter = session.encounter().unwrap();
        if encounter.is_resolved() || !session.character().is_conscious() {
            break;
        }
        let target = encounter
            .participants
            .iter()
            .find(|p| p.side == Side::Enemy && p.is_active())
            .map(|p| (p.id.clone(), p.distance_feet));

        if let Some((id, distance)) = target {
            if distance > 5 {
                let _ = session.move_distance(&id, -((distance - 5) as i32), &mut roller);
            }
            let _ = session.attack(&id, &mut roller);
        }
        assert_invariants(session.character());

        session.next_turn(&mut roller).unwrap();
        assert_invariants(session.character());
        for participant in &session.encounter().unwrap().participants {
            assert!(participant.hit_points.current >= 0);
        }
    }

    let character = session.character().clone();
    let encounter = session.end_combat().unwrap();
    (character, encounter)
}

#[test]
fn test_seeded_skirmish_keeps_invariants() {
    separator("Seeded skirmish");

    let (character, encounter) = skirmish(42);
    print_character(&character);
    println!(
        "  Rounds: {}  Enemies left: {}",
        encounter.round,
        encounter.enemies_remaining()
    );
    assert!(encounter.round >= 1);

    let mut session = SessionController::new(character);
    session.long_rest().unwrap();
    let rested = session.character();
    assert_eq!(rested.hit_points.current, rested.hit_points.max);
    assert_eq!(rested.resources.favor, rested.favor_max());
}

#[test]
fn test_same_seed_same_fight() {
    let (first_character, first_encounter) = skirmish(7);
    let (second_character, second_encounter) = skirmish(7);
    assert_eq!(first_character, second_character);
    assert_eq!(first_encounter, second_encounter);
}
