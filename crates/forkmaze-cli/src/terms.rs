use forkmaze_core::Terminology;

/// Network flavour: firewalls and links instead of walls and paths.
pub struct NetworkTerms;

impl Terminology for NetworkTerms {
    fn wall(&self) -> &str {
        "firewall"
    }

    fn walls(&self) -> &str {
        "firewalls"
    }

    fn path(&self) -> &str {
        "link"
    }

    fn paths(&self) -> &str {
        "links"
    }

    fn dead_end(&self) -> &str {
        "terminal"
    }

    fn dead_ends(&self) -> &str {
        "terminals"
    }

    fn vault(&self) -> &str {
        "data stockpile"
    }

    fn fork(&self) -> &str {
        "branch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkmaze_core::Mark;

    #[test]
    fn test_network_words() {
        let terms = NetworkTerms;
        assert_eq!(terms.mark(Mark::Wall), "firewall");
        assert_eq!(terms.marks(Mark::Path), "links");
        assert_eq!(terms.vault(), "data stockpile");
    }
}
