/// Single-line text input used by every form in the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    masked: bool,
}

impl TextField {
    /// A field that renders bullets instead of its content (PINs).
    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn trimmed(&self) -> String {
        self.value.trim().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() {
            self.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Parses the content as a finite number, ignoring surrounding spaces.
    pub fn as_number(&self) -> Option<f64> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(s: &str) -> TextField {
        let mut f = TextField::default();
        s.chars().for_each(|c| f.push(c));
        f
    }

    #[test]
    fn masked_field_hides_content() {
        let mut pin = TextField::masked();
        "1234".chars().for_each(|c| pin.push(c));
        assert_eq!(pin.value(), "1234");
        assert_eq!(pin.display(), "••••");
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut f = field("0555");
        f.backspace();
        assert_eq!(f.value(), "055");
    }

    #[test]
    fn parses_numbers_leniently_but_finitely() {
        assert_eq!(field(" 10 ").as_number(), Some(10.0));
        assert_eq!(field("12.5").as_number(), Some(12.5));
        assert_eq!(field("").as_number(), None);
        assert_eq!(field("ten").as_number(), None);
        assert_eq!(field("inf").as_number(), None);
        assert_eq!(field("NaN").as_number(), None);
    }
}
