use memoize::memoize;

#[memoize]
fn fib(n: u64) -> u128 {
    if n < 2 { n as u128 } else { fib(n - 1) + fib(n - 2) }
}

fn main() {
    assert_eq!(fib(100), 354224848179261915075);
}
