//! Capitalization helpers shared by the emitters. Case *conversions*
//! (snake/camel/pascal) go through `heck`.

pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn decapitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_upcases_first_letter_only() {
        assert_eq!(capitalize("point"), "Point");
        assert_eq!(capitalize("alreadyCamel"), "AlreadyCamel");
        assert_eq!(capitalize("x"), "X");
    }

    #[test]
    fn capitalize_noop_on_empty() {
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn decapitalize_downcases_first_letter_only() {
        assert_eq!(decapitalize("Point"), "point");
        assert_eq!(decapitalize("POINT"), "pOINT");
    }
}
