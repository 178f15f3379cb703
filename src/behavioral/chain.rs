// Chain of Responsibility - a request walks a linked list of handlers
// until one of them takes it.

use tracing::debug;

// ============================================================================
// Handler interface and the shared forwarding link
// ============================================================================

pub trait Handler {
    fn name(&self) -> &'static str;

    fn link(&self) -> &Link;

    fn link_mut(&mut self) -> &mut Link;

    /// Consume the request or hand it to the successor.
    /// `None` means nobody in the rest of the chain took it.
    fn handle(&self, request: &str) -> Option<String>;

    /// Wire `next` as the successor and return it so calls can be chained:
    /// `monkey.set_next(squirrel).set_next(dog)`.
    fn set_next(&mut self, next: Box<dyn Handler>) -> &mut dyn Handler {
        self.link_mut().attach(next)
    }

    fn next(&self) -> Option<&dyn Handler> {
        self.link().next()
    }
}

/// Owned successor slot every handler embeds.
#[derive(Default)]
pub struct Link {
    next: Option<Box<dyn Handler>>,
}

impl Link {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces (and drops) any previous successor.
    pub fn attach(&mut self, next: Box<dyn Handler>) -> &mut dyn Handler {
        &mut **self.next.insert(next)
    }

    pub fn next(&self) -> Option<&dyn Handler> {
        self.next.as_deref()
    }

    pub fn forward(&self, request: &str) -> Option<String> {
        match &self.next {
            Some(next) => {
                debug!(to = next.name(), request, "Forwarding request");
                next.handle(request)
            }
            None => {
                debug!(request, "End of chain, request unhandled");
                None
            }
        }
    }
}

fn eat(name: &str, request: &str) -> String {
    format!("{name}: I'll eat the {request}.")
}

// ============================================================================
// Concrete handlers
// ============================================================================

#[derive(Default)]
pub struct MonkeyHandler {
    link: Link,
}

impl MonkeyHandler {
    pub const FOOD: &'static str = "Banana";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for MonkeyHandler {
    fn name(&self) -> &'static str {
        "Monkey"
    }

    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }

    fn handle(&self, request: &str) -> Option<String> {
        if request == Self::FOOD {
            Some(eat(self.name(), request))
        } else {
            self.link.forward(request)
        }
    }
}

#[derive(Default)]
pub struct SquirrelHandler {
    link: Link,
}

impl SquirrelHandler {
    pub const FOOD: &'static str = "Nut";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for SquirrelHandler {
    fn name(&self) -> &'static str {
        "Squirrel"
    }

    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }

    fn handle(&self, request: &str) -> Option<String> {
        if request == Self::FOOD {
            Some(eat(self.name(), request))
        } else {
            self.link.forward(request)
        }
    }
}

#[derive(Default)]
pub struct DogHandler {
    link: Link,
}

impl DogHandler {
    pub const FOOD: &'static str = "MeatBall";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for DogHandler {
    fn name(&self) -> &'static str {
        "Dog"
    }

    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }

    fn handle(&self, request: &str) -> Option<String> {
        if request == Self::FOOD {
            Some(eat(self.name(), request))
        } else {
            self.link.forward(request)
        }
    }
}

// ============================================================================
// Client helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub request: String,
    pub result: Option<String>,
}

/// Offer every request to the head of the chain, in order.
pub fn serve<S: AsRef<str>>(head: &dyn Handler, requests: &[S]) -> Vec<Delivery> {
    requests
        .iter()
        .map(|request| {
            let request = request.as_ref();
            Delivery {
                request: request.to_string(),
                result: head.handle(request),
            }
        })
        .collect()
}

/// Handler names from `head` to the end of the chain.
pub fn chain_names(head: &dyn Handler) -> Vec<&'static str> {
    let mut names = Vec::new();
    let mut current = Some(head);
    while let Some(handler) = current {
        names.push(handler.name());
        current = handler.next();
    }
    names
}

/// "Monkey > Squirrel > Dog"
pub fn describe(head: &dyn Handler) -> String {
    chain_names(head).join(" > ")
}

// ============================================================================
// Tests
// ============================================================================
