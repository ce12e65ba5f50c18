use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeFamily {
    Physical,
    Mental,
    Spiritual,
    Social,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub physical: i32,
    pub mental: i32,
    pub spiritual: i32,
    pub social: i32,
}

impl AttributeSet {
    pub fn get(&self, family: AttributeFamily) -> i32 {
        match family {
            AttributeFamily::Physical => self.physical,
            AttributeFamily::Mental => self.mental,
            AttributeFamily::Spiritual => self.spiritual,
            AttributeFamily::Social => self.social,
        }
    }

    /// `⌊(a - 5) / 2⌋`, per §4.G.2.
    pub fn bonus(&self, family: AttributeFamily) -> i32 {
        attribute_bonus(self.get(family))
    }
}

/// `attribute_bonus(a) = ⌊(a − 5) / 2⌋`
pub fn attribute_bonus(attribute: i32) -> i32 {
    (attribute - 5).div_euclid(2)
}
