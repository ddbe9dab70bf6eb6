//! Standard d20 ruleset - the default game system
//!
//! Classic d20 math: modifier = floor((score - 10) / 2), roll-then-modify
//! resolution, crit threat at or above the attack's crit range.

use crate::value_objects::{DiceFormula, DiceParseError, StatBlock};

use super::actions::{AttackSpec, SkillSpec, SpellSpec};
use super::conditions::{resolve_condition_modifiers, ConditionContext, ConditionModifiers};
use super::traits::{
    AbilityDef, AttackResult, CheckResult, DamageResult, DieRoller, ResourceDef, Ruleset,
    SpellResult,
};

const ABILITIES: &[AbilityDef] = &[
    AbilityDef { key: "STR", label: "Strength", order: 0 },
    AbilityDef { key: "DEX", label: "Dexterity", order: 1 },
    AbilityDef { key: "CON", label: "Constitution", order: 2 },
    AbilityDef { key: "INT", label: "Intelligence", order: 3 },
    AbilityDef { key: "WIS", label: "Wisdom", order: 4 },
    AbilityDef { key: "CHA", label: "Charisma", order: 5 },
];

const RESOURCES: &[ResourceDef] = &[
    ResourceDef { key: "HP", label: "Hit Points", order: 0 },
    ResourceDef { key: "MP", label: "Mana Points", order: 1 },
];

/// The default d20 game system.
pub struct StandardD20;

impl Default for StandardD20 {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardD20 {
    pub fn new() -> Self {
        Self
    }

    fn roll_d20(roll: DieRoller) -> i32 {
        roll(20)
    }

    fn roll_damage_formula(
        formula: &str,
        flat_bonus: i32,
        roll: DieRoller,
    ) -> Result<(i32, String), DiceParseError> {
        let parsed = DiceFormula::parse(formula)?;
        let result = parsed.roll_with(roll);
        Ok((result.total + flat_bonus, result.breakdown()))
    }
}

impl Ruleset for StandardD20 {
    fn ruleset_id(&self) -> &str {
        "d20"
    }

    fn display_name(&self) -> &str {
        "Standard d20"
    }

    fn abilities(&self) -> &[AbilityDef] {
        ABILITIES
    }

    fn resources(&self) -> &[ResourceDef] {
        RESOURCES
    }

    fn ability_modifier(&self, score: i32) -> i32 {
        (score - 10).div_euclid(2)
    }

    fn compute_attack(
        &self,
        sheet: &StatBlock,
        attack: &AttackSpec,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> AttackResult {
        let d20 = Self::roll_d20(roll);
        let condition_mods = self.apply_conditions_modifiers(ctx);
        let modifier =
            self.ability_modifier(sheet.get(&attack.ability)) + attack.bonus + condition_mods.attack;

        AttackResult {
            d20,
            modifier,
            total: d20 + modifier,
            is_nat20: d20 == 20,
            is_nat1: d20 == 1,
            is_crit_threat: d20 >= attack.crit_range as i32,
        }
    }

    fn compute_damage(
        &self,
        sheet: &StatBlock,
        attack: &AttackSpec,
        is_crit: bool,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> Result<DamageResult, DiceParseError> {
        let _ = sheet; // d20 damage carries its bonus in the formula itself
        let condition_mods = self.apply_conditions_modifiers(ctx);
        let (rolled, breakdown) =
            Self::roll_damage_formula(&attack.damage, condition_mods.damage, roll)?;

        let (total, detail) = if is_crit {
            let multiplied = rolled * attack.crit_multiplier as i32;
            (
                multiplied,
                format!("{} x{} (crit) = {}", breakdown, attack.crit_multiplier, multiplied),
            )
        } else {
            (rolled, breakdown)
        };

        Ok(DamageResult {
            total: total.max(0),
            detail,
        })
    }

    fn compute_skill_check(
        &self,
        sheet: &StatBlock,
        skill: &SkillSpec,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> CheckResult {
        let d20 = Self::roll_d20(roll);
        let condition_mods = self.apply_conditions_modifiers(ctx);
        let modifier =
            self.ability_modifier(sheet.get(&skill.ability)) + skill.bonus + condition_mods.skill;
        let total = d20 + modifier;

        CheckResult {
            d20,
            modifier,
            total,
            dc: skill.dc,
            success: skill.dc.map(|dc| total >= dc),
            is_nat20: d20 == 20,
            is_nat1: d20 == 1,
        }
    }

    fn compute_spell(
        &self,
        sheet: &StatBlock,
        spell: &SpellSpec,
        ctx: &ConditionContext,
        roll: DieRoller,
    ) -> Result<SpellResult, DiceParseError> {
        let condition_mods = self.apply_conditions_modifiers(ctx);
        let modifier =
            self.ability_modifier(sheet.get(&spell.ability)) + spell.bonus + condition_mods.spell;

        let (d20, total) = if spell.rolls {
            let d20 = Self::roll_d20(roll);
            (Some(d20), Some(d20 + modifier))
        } else {
            (None, None)
        };

        let damage = match &spell.damage {
            Some(formula) => {
                let (rolled, breakdown) =
                    Self::roll_damage_formula(formula, condition_mods.damage, roll)?;
                Some(DamageResult {
                    total: rolled.max(0),
                    detail: breakdown,
                })
            }
            None => None,
        };

        Ok(SpellResult {
            d20,
            modifier,
            total,
            mp_cost: (spell.mp_cost + condition_mods.mp_cost).max(0),
            damage,
            applies: spell.applies.clone(),
        })
    }

    fn apply_conditions_modifiers(&self, ctx: &ConditionContext) -> ConditionModifiers {
        resolve_condition_modifiers(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_systems::ConditionKind;

    fn fixed(rolls: &[i32]) -> impl FnMut(u8) -> i32 + '_ {
        let mut iter = rolls.iter().copied();
        move |_| iter.next().unwrap_or(1)
    }

    fn sheet() -> StatBlock {
        StatBlock::new().with("STR", 16).with("DEX", 14)
    }

    #[test]
    fn ability_modifier_floors() {
        let sys = StandardD20::new();
        assert_eq!(sys.ability_modifier(10), 0);
        assert_eq!(sys.ability_modifier(16), 3);
        assert_eq!(sys.ability_modifier(9), -1);
        assert_eq!(sys.ability_modifier(7), -2);
        assert_eq!(sys.ability_modifier(20), 5);
    }

    #[test]
    fn attack_adds_ability_and_bonus() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Longsword", "STR", "1d8+3").with_bonus(1);
        let result = sys.compute_attack(
            &sheet(),
            &attack,
            &ConditionContext::default(),
            &mut fixed(&[12]),
        );
        assert_eq!(result.d20, 12);
        assert_eq!(result.modifier, 4); // STR 16 -> +3, bonus +1
        assert_eq!(result.total, 16);
        assert!(!result.is_nat20);
        assert!(!result.is_crit_threat);
    }

    #[test]
    fn crit_threat_respects_custom_range() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Keen blade", "STR", "1d8").with_crit(19, 2);
        for (d20, expected) in [(18, false), (19, true), (20, true)] {
            let result = sys.compute_attack(
                &StatBlock::new(),
                &attack,
                &ConditionContext::default(),
                &mut fixed(&[d20]),
            );
            assert_eq!(result.is_crit_threat, expected, "d20={}", d20);
        }
    }

    #[test]
    fn nat20_and_nat1_flags() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Club", "STR", "1d4");
        let nat20 = sys.compute_attack(
            &StatBlock::new(),
            &attack,
            &ConditionContext::default(),
            &mut fixed(&[20]),
        );
        assert!(nat20.is_nat20 && nat20.is_crit_threat);
        let nat1 = sys.compute_attack(
            &StatBlock::new(),
            &attack,
            &ConditionContext::default(),
            &mut fixed(&[1]),
        );
        assert!(nat1.is_nat1 && !nat1.is_crit_threat);
    }

    #[test]
    fn damage_doubles_on_crit() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Shortsword", "DEX", "1d6+2");
        let result = sys
            .compute_damage(
                &StatBlock::new(),
                &attack,
                true,
                &ConditionContext::default(),
                &mut fixed(&[4]),
            )
            .unwrap();
        assert_eq!(result.total, 12); // (4 + 2) * 2
        assert!(result.detail.contains("crit"));
    }

    #[test]
    fn damage_uncrit_is_plain_roll() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Shortsword", "DEX", "1d6+2");
        let result = sys
            .compute_damage(
                &StatBlock::new(),
                &attack,
                false,
                &ConditionContext::default(),
                &mut fixed(&[4]),
            )
            .unwrap();
        assert_eq!(result.total, 6);
    }

    #[test]
    fn damage_never_negative() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Pebble", "STR", "1d2");
        let ctx = ConditionContext::actor_only(vec![
            ConditionKind::Weakened,
            ConditionKind::Weakened,
        ]);
        let result = sys
            .compute_damage(&StatBlock::new(), &attack, false, &ctx, &mut fixed(&[1]))
            .unwrap();
        assert_eq!(result.total, 0); // 1 - 4 clamps at 0
    }

    #[test]
    fn blinded_attacker_rolls_at_minus_two() {
        let sys = StandardD20::new();
        let attack = AttackSpec::new("Swing", "STR", "1d6");
        let ctx = ConditionContext::actor_only(vec![ConditionKind::Blinded]);
        let result = sys.compute_attack(&StatBlock::new(), &attack, &ctx, &mut fixed(&[10]));
        assert_eq!(result.modifier, -2);
        assert_eq!(result.total, 8);
    }

    #[test]
    fn skill_check_reports_success_against_dc() {
        let sys = StandardD20::new();
        let skill = SkillSpec::new("Acrobatics", "DEX").with_bonus(2).against_dc(15);
        let result = sys.compute_skill_check(
            &sheet(),
            &skill,
            &ConditionContext::default(),
            &mut fixed(&[11]),
        );
        assert_eq!(result.modifier, 4); // DEX 14 -> +2, bonus +2
        assert_eq!(result.total, 15);
        assert_eq!(result.success, Some(true));
    }

    #[test]
    fn skill_check_without_dc_reports_no_success() {
        let sys = StandardD20::new();
        let skill = SkillSpec::new("Perception", "WIS");
        let result = sys.compute_skill_check(
            &StatBlock::new(),
            &skill,
            &ConditionContext::default(),
            &mut fixed(&[11]),
        );
        assert_eq!(result.success, None);
    }

    #[test]
    fn spell_reports_adjusted_cost_and_effects() {
        let sys = StandardD20::new();
        let spell = SpellSpec::new("Hex", "INT", 3).applying(ConditionKind::Weakened);
        let ctx = ConditionContext::actor_only(vec![ConditionKind::Exhausted]);
        let result = sys
            .compute_spell(&StatBlock::new(), &spell, &ctx, &mut fixed(&[14]))
            .unwrap();
        assert_eq!(result.mp_cost, 4); // 3 + exhausted
        assert_eq!(result.d20, Some(14));
        assert_eq!(result.applies, vec![ConditionKind::Weakened]);
    }

    #[test]
    fn non_rolling_spell_skips_the_d20() {
        let sys = StandardD20::new();
        let spell = SpellSpec::new("Cure", "WIS", 2).without_roll();
        let result = sys
            .compute_spell(
                &StatBlock::new(),
                &spell,
                &ConditionContext::default(),
                &mut fixed(&[]),
            )
            .unwrap();
        assert_eq!(result.d20, None);
        assert_eq!(result.total, None);
        assert_eq!(result.mp_cost, 2);
    }

    #[test]
    fn resolve_action_matches_on_kind() {
        use crate::game_systems::{Action, ActionOutcome};

        let sys = StandardD20::new();
        let action = Action::Skill(SkillSpec::new("Stealth", "DEX").against_dc(10));
        let outcome = sys
            .resolve_action(
                &sheet(),
                &action,
                &ConditionContext::default(),
                &mut fixed(&[9]),
            )
            .unwrap();
        match outcome {
            ActionOutcome::Skill(check) => assert_eq!(check.total, 11),
            other => panic!("expected skill outcome, got {:?}", other),
        }
    }

    #[test]
    fn spell_damage_rolls_its_formula() {
        let sys = StandardD20::new();
        let spell = SpellSpec::new("Fire Dart", "INT", 2).with_damage("2d4+1");
        let result = sys
            .compute_spell(
                &StatBlock::new(),
                &spell,
                &ConditionContext::default(),
                &mut fixed(&[15, 3, 2]),
            )
            .unwrap();
        let damage = result.damage.unwrap();
        assert_eq!(damage.total, 6); // 3 + 2 + 1
    }
}
