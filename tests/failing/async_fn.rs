use memoize::memoize;

#[memoize]
async fn fetch(n: u32) -> u32 {
    n + 1
}

fn main() {}
