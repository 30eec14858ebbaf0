use super::{subject_mut, Payload, TransformResult, Transformer};
use crate::entity::{Entity, EntityKind, MotionValue, Record};
use crate::game::{DamageType, WeaponType};
use crate::repository::EntityRepository;

pub struct MotionValueTransformer;

impl Transformer for MotionValueTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::MotionValue
    }

    fn construct(&self, payload: &Payload) -> TransformResult<Record> {
        payload.require(&["name", "weaponType"])?;

        let motion_value = MotionValue::new(
            payload.string("name")?.unwrap_or_default(),
            payload
                .parsed::<WeaponType>("weaponType")?
                .unwrap_or(WeaponType::GreatSword),
        );
        Ok(motion_value.into_record())
    }

    fn update(
        &self,
        _repo: &dyn EntityRepository,
        record: &mut Record,
        payload: &Payload,
    ) -> TransformResult<()> {
        let motion_value = subject_mut::<MotionValue>(record)?;

        if let Some(name) = payload.string("name")? {
            motion_value.name = name;
        }

        if let Some(weapon_type) = payload.parsed::<WeaponType>("weaponType")? {
            motion_value.weapon_type = weapon_type;
        }

        payload
            .parsed_patch::<DamageType>("damageType")?
            .apply_to(&mut motion_value.damage_type);
        payload.patch("stun")?.apply_to(&mut motion_value.stun);
        payload.patch("exhaust")?.apply_to(&mut motion_value.exhaust);

        if let Some(hits) = payload.patch::<Vec<u32>>("hits")?.into_option() {
            motion_value.hits = hits.unwrap_or_default();
        }

        Ok(())
    }

    fn delete(&self, _repo: &dyn EntityRepository, _record: &Record) -> TransformResult<()> {
        Ok(())
    }
}
