use super::{clean, DataNode, ScrapeError, ScrapeResult, WeaponData, WeaponDataInterpreter};
use crate::entity::{Slot, WeaponElement};
use crate::game::{attribute, Element};

fn invalid(node: &dyn DataNode) -> ScrapeError {
    ScrapeError::InvalidValue {
        label: clean(node.label()),
        value: clean(node.lead()),
    }
}

fn has_label(node: &dyn DataNode, label: &str) -> bool {
    clean(node.label()) == label
}

/// Every built-in interpreter, in the order they are tried
pub fn default_interpreters() -> Vec<Box<dyn WeaponDataInterpreter>> {
    vec![
        Box::new(PhialTypeInterpreter),
        Box::new(ShellingTypeInterpreter),
        Box::new(AffinityInterpreter),
        Box::new(EldersealInterpreter),
        Box::new(SlotsInterpreter),
        Box::new(ElementInterpreter),
    ]
}

/// "Phial" caption; charge blade and switch axe phial type
pub struct PhialTypeInterpreter;

impl WeaponDataInterpreter for PhialTypeInterpreter {
    fn supports(&self, node: &dyn DataNode) -> bool {
        has_label(node, "Phial")
    }

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()> {
        target.set_attribute(attribute::PHIAL_TYPE, clean(node.lead()));
        Ok(())
    }
}

/// "Shelling" caption; gunlance shelling type and level
pub struct ShellingTypeInterpreter;

impl WeaponDataInterpreter for ShellingTypeInterpreter {
    fn supports(&self, node: &dyn DataNode) -> bool {
        has_label(node, "Shelling")
    }

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()> {
        target.set_attribute(attribute::SHELLING_TYPE, clean(node.lead()));
        Ok(())
    }
}

/// "Affinity" caption, e.g. `-15%`
pub struct AffinityInterpreter;

impl WeaponDataInterpreter for AffinityInterpreter {
    fn supports(&self, node: &dyn DataNode) -> bool {
        has_label(node, "Affinity")
    }

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()> {
        let value = clean(node.lead());
        let affinity: i32 = value
            .trim_end_matches('%')
            .trim_start_matches('+')
            .trim()
            .parse()
            .map_err(|_| invalid(node))?;

        target.set_attribute(attribute::AFFINITY, affinity);
        Ok(())
    }
}

/// "Elderseal" caption, stored lowercase
pub struct EldersealInterpreter;

impl WeaponDataInterpreter for EldersealInterpreter {
    fn supports(&self, node: &dyn DataNode) -> bool {
        has_label(node, "Elderseal")
    }

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()> {
        let value = clean(node.lead()).to_lowercase();
        if value.is_empty() {
            return Err(invalid(node));
        }

        target.set_attribute(attribute::ELDERSEAL, value);
        Ok(())
    }
}

/// "Slots" caption; every digit 1 to 4 is one decoration slot
pub struct SlotsInterpreter;

impl WeaponDataInterpreter for SlotsInterpreter {
    fn supports(&self, node: &dyn DataNode) -> bool {
        has_label(node, "Slots")
    }

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()> {
        let mut slots = Vec::new();
        for c in node.lead().chars().filter(char::is_ascii_digit) {
            match c.to_digit(10) {
                Some(rank @ 1..=4) => slots.push(Slot { rank: rank as u8 }),
                _ => return Err(invalid(node)),
            }
        }

        target.slots = slots;
        Ok(())
    }
}

/// A caption naming an element; the value is the damage, in parentheses
/// when the element is hidden
pub struct ElementInterpreter;

impl ElementInterpreter {
    fn element(node: &dyn DataNode) -> Option<Element> {
        clean(node.label()).to_lowercase().parse().ok()
    }
}

impl WeaponDataInterpreter for ElementInterpreter {
    fn supports(&self, node: &dyn DataNode) -> bool {
        Self::element(node).is_some()
    }

    fn parse(&self, node: &dyn DataNode, target: &mut WeaponData) -> ScrapeResult<()> {
        let element = Self::element(node).ok_or_else(|| invalid(node))?;

        let value = clean(node.lead());
        let hidden = value.starts_with('(') && value.ends_with(')');
        let damage: u32 = value
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim()
            .parse()
            .map_err(|_| invalid(node))?;

        target.elements.retain(|existing| existing.element != element);
        target.elements.push(WeaponElement {
            element,
            damage,
            hidden,
        });
        Ok(())
    }
}
