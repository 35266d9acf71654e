//! Dispatch benchmarks.
//!
//! Run with: `cargo bench -p switchyard`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use switchyard::{from_fn, Body, Dispatcher, Handler, Request, Response};

fn build_dispatcher(num_routes: usize) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    let hook = || {
        from_fn("noop", |_req, _res, next| {
            next.proceed();
            Ok(())
        })
    };

    // Fast-path static routes
    for i in 0..num_routes / 3 {
        dispatcher
            .get(format!("/api/v1/resource{i}"))
            .handler(Handler::sync(|_req, _res| Ok(Body::Empty)))
            .expect("register static route");
    }

    // Phased dynamic routes
    for i in 0..num_routes / 3 {
        dispatcher
            .get(format!("/api/v1/resource{i}/:id"))
            .before(hook())
            .handler(Handler::sync(|_req, _res| Ok(Body::Empty)))
            .expect("register param route");
    }

    // Nested dynamic routes
    for i in 0..num_routes / 3 {
        dispatcher
            .get(format!("/api/v1/org/:orgId/resource{i}/:id"))
            .before(hook())
            .handler(Handler::sync(|_req, _res| Ok(Body::Empty)))
            .expect("register nested route");
    }

    dispatcher
}

fn bench_lookup(c: &mut Criterion) {
    let dispatcher = build_dispatcher(300);
    let table = dispatcher.table();

    c.bench_function("lookup_fast_path", |b| {
        b.iter(|| black_box(table.lookup(&Method::GET, black_box("/api/v1/resource50")).is_some()));
    });

    c.bench_function("lookup_dynamic", |b| {
        b.iter(|| black_box(table.lookup(&Method::GET, black_box("/api/v1/resource50/123")).is_some()));
    });

    c.bench_function("lookup_nested", |b| {
        b.iter(|| {
            black_box(
                table
                    .lookup(&Method::GET, black_box("/api/v1/org/acme/resource50/123"))
                    .is_some(),
            )
        });
    });

    c.bench_function("lookup_miss", |b| {
        b.iter(|| black_box(table.lookup(&Method::GET, black_box("/not/found")).is_none()));
    });
}

fn bench_dispatch_fast_path(c: &mut Criterion) {
    let dispatcher = build_dispatcher(300);

    c.bench_function("dispatch_fast_path", |b| {
        b.iter(|| {
            let mut req = Request::new(Method::GET, "/api/v1/resource10");
            let mut res = Response::new();
            let handled = dispatcher.handle_request(&mut req, &mut res).into_immediate();
            dispatcher.finish(&mut req);
            black_box(handled)
        });
    });
}

fn bench_route_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_by_route_count");

    for count in [30, 150, 600] {
        let dispatcher = build_dispatcher(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &dispatcher, |b, d| {
            b.iter(|| black_box(d.table().lookup(&Method::GET, "/api/v1/resource5/42").is_some()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookup, bench_dispatch_fast_path, bench_route_count);
criterion_main!(benches);
