use memoize::{memoize, variadic, Variadic};

#[memoize(name = "sum_all", concurrency = "relaxed", capacity = 4)]
pub fn sum_all(base: i64, rest: Variadic<i64>) -> i64 {
    base + rest.iter().sum::<i64>()
}

#[memoize(exclusive)]
fn greet(who: &'static str) -> String {
    format!("hello {}", who)
}

#[memoize]
fn unit() {}

fn main() {
    assert_eq!(sum_all(1, variadic![2, 3]), 6);
    assert_eq!(sum_all(1, variadic![]), 1);
    assert_eq!(greet("world"), "hello world");
    unit();
}
