// hit_test.rs — maps a pointer to the zone under it. Pure: same inputs, same answer.
//
// Tie-break for overlapping geometry (limb joints overlap by construction): the nearest
// intersection along the pick ray wins. Zones are scanned in catalog order and a later zone
// only replaces the current best when it is nearer by more than DEPTH_EPSILON, so depths that
// agree within the epsilon resolve to the zone listed first.
//
// Cylinders and spheres are exact quadrics here while the canvas draws them as 16-sided hulls;
// the two outlines differ by under 2% of the radius.
use crate::camera::{dot, Ndc, Ray, V3, ViewTransform};
use crate::zones::{HitShape, Zone, ZoneId};

pub const DEPTH_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit { pub index: usize, pub depth: f32 }

pub fn hit_test(pointer: Ndc, view: &ViewTransform, zones: &[Zone]) -> Option<ZoneId> {
    pick(pointer, view, zones).map(|h| zones[h.index].id.clone())
}

pub fn pick(pointer: Ndc, view: &ViewTransform, zones: &[Zone]) -> Option<Hit> {
    if !pointer.in_viewport() { return None; }
    let ray = view.figure_ray(pointer);
    let mut best: Option<Hit> = None;
    for (index, zone) in zones.iter().enumerate() {
        let local = Ray { origin: zone.to_local(ray.origin), dir: zone.dir_to_local(ray.dir) };
        let Some(depth) = intersect(&zone.shape, &local) else { continue };
        if best.map_or(true, |b| depth < b.depth - DEPTH_EPSILON) {
            best = Some(Hit { index, depth });
        }
    }
    best
}

/// Distance along `ray` (unit direction, shape-local frame) to the first surface in front of it.
pub fn intersect(shape: &HitShape, ray: &Ray) -> Option<f32> {
    match *shape {
        HitShape::Sphere { radius } => sphere(radius, ray),
        HitShape::Cylinder { radius_top, radius_bottom, height } => frustum(radius_top, radius_bottom, height, ray),
        HitShape::Box { width, height, depth } => slab([width * 0.5, height * 0.5, depth * 0.5], ray),
    }
}

fn nearest_ahead(ts: impl IntoIterator<Item = f32>) -> Option<f32> {
    ts.into_iter().filter(|t| t.is_finite() && *t >= 0.0).min_by(|a, b| a.total_cmp(b))
}

fn sphere(r: f32, ray: &Ray) -> Option<f32> {
    let (o, d) = (ray.origin, ray.dir);
    let b = dot(o, d);
    let c = dot(o, o) - r * r;
    let disc = b * b - c;
    if disc < 0.0 { return None; }
    let s = disc.sqrt();
    nearest_ahead([-b - s, -b + s])
}

// Truncated cone along local Y with caps; radius varies linearly from bottom to top.
fn frustum(rt: f32, rb: f32, h: f32, ray: &Ray) -> Option<f32> {
    let (o, d) = (ray.origin, ray.dir);
    let half = h * 0.5;
    let k = (rt - rb) / h;
    let r0 = (rt + rb) * 0.5;
    let q = r0 + k * o[1];
    let a = d[0]*d[0] + d[2]*d[2] - k*k*d[1]*d[1];
    let b = 2.0 * (o[0]*d[0] + o[2]*d[2] - k*d[1]*q);
    let c = o[0]*o[0] + o[2]*o[2] - q*q;

    let mut ts: Vec<f32> = Vec::with_capacity(4);
    if a.abs() > 1e-9 {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let s = disc.sqrt();
            ts.extend([(-b - s) / (2.0 * a), (-b + s) / (2.0 * a)]);
        }
    } else if b.abs() > 1e-9 {
        ts.push(-c / b);
    }
    ts.retain(|t| {
        let y = o[1] + t * d[1];
        y.abs() <= half && r0 + k * y >= 0.0
    });

    if d[1].abs() > 1e-9 {
        for (yc, rc) in [(half, rt), (-half, rb)] {
            let t = (yc - o[1]) / d[1];
            let (x, z) = (o[0] + t * d[0], o[2] + t * d[2]);
            if x * x + z * z <= rc * rc { ts.push(t); }
        }
    }
    nearest_ahead(ts)
}

fn slab(half: V3, ray: &Ray) -> Option<f32> {
    let (o, d) = (ray.origin, ray.dir);
    let (mut tmin, mut tmax) = (f32::NEG_INFINITY, f32::INFINITY);
    for i in 0..3 {
        if d[i].abs() < 1e-9 {
            if o[i].abs() > half[i] { return None; }
            continue;
        }
        let (t1, t2) = ((-half[i] - o[i]) / d[i], (half[i] - o[i]) / d[i]);
        tmin = tmin.max(t1.min(t2));
        tmax = tmax.min(t1.max(t2));
        if tmin > tmax { return None; }
    }
    nearest_ahead([tmin, tmax])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneCatalog;

    fn ball(id: &str, position: V3, radius: f32) -> Zone {
        Zone { id: ZoneId::new(id), shape: HitShape::Sphere { radius }, position, rotation_z: 0.0 }
    }

    fn aim(view: &ViewTransform, p: V3) -> Ndc { view.project(p).unwrap().0 }

    #[test]
    fn each_zone_centre_hits_that_zone_from_the_front() {
        let cat = ZoneCatalog::builtin().unwrap();
        let view = ViewTransform::default();
        for z in cat.list_zones() {
            assert_eq!(hit_test(aim(&view, z.position), &view, cat.list_zones()).as_ref(), Some(&z.id),
                "aiming at {}", z.id);
        }
    }

    #[test]
    fn back_view_still_finds_mirrored_zones() {
        let cat = ZoneCatalog::builtin().unwrap();
        let mut view = ViewTransform::default();
        view.rotation_y = std::f32::consts::PI;
        let hand = cat.get("hand_left").unwrap();
        let ndc = aim(&view, hand.position);
        assert!(ndc.x > 0.0, "left hand shows on the right when seen from behind");
        assert_eq!(hit_test(ndc, &view, cat.list_zones()).unwrap(), "hand_left");
    }

    #[test]
    fn side_view_near_arm_occludes_chest() {
        let cat = ZoneCatalog::builtin().unwrap();
        let mut view = ViewTransform::default();
        view.rotation_y = std::f32::consts::FRAC_PI_2;
        let chest = cat.get("chest").unwrap();
        assert_eq!(hit_test(aim(&view, chest.position), &view, cat.list_zones()).unwrap(), "arm_upper_left");
    }

    #[test]
    fn empty_space_and_off_viewport_pointers_miss() {
        let cat = ZoneCatalog::builtin().unwrap();
        let view = ViewTransform::default();
        assert_eq!(hit_test(Ndc::new(0.95, -0.95), &view, cat.list_zones()), None);
        assert_eq!(hit_test(Ndc::new(1.5, 0.0), &view, cat.list_zones()), None);
        assert_eq!(hit_test(Ndc::new(0.0, f32::NAN), &view, cat.list_zones()), None);
    }

    #[test]
    fn nearer_zone_wins_regardless_of_catalog_order() {
        let view = ViewTransform::default();
        let back = ball("back", [0.0, 0.5, 0.0], 0.5);
        let front = ball("front", [0.0, 0.5, 1.0], 0.3);
        let centre = Ndc::new(0.0, 0.0);
        assert_eq!(hit_test(centre, &view, &[back.clone(), front.clone()]).unwrap(), "front");
        assert_eq!(hit_test(centre, &view, &[front, back]).unwrap(), "front");
    }

    #[test]
    fn equal_depth_falls_back_to_catalog_order_every_time() {
        let view = ViewTransform::default();
        let zones = [ball("first", [0.0, 0.5, 0.0], 0.5), ball("second", [0.0, 0.5, 0.0], 0.5)];
        for _ in 0..3 {
            assert_eq!(hit_test(Ndc::new(0.0, 0.0), &view, &zones).unwrap(), "first");
        }
        let swapped = [zones[1].clone(), zones[0].clone()];
        assert_eq!(hit_test(Ndc::new(0.0, 0.0), &view, &swapped).unwrap(), "second");
    }

    #[test]
    fn neck_and_chest_overlap_and_the_nearer_surface_wins() {
        let cat = ZoneCatalog::builtin().unwrap();
        let view = ViewTransform::default();
        // Just below the chest rim, where the neck sphere dips into the torso.
        let ndc = aim(&view, [0.0, 2.47, 0.59]);
        let ray = view.figure_ray(ndc);
        let depth_of = |id: &str| {
            let z = cat.get(id).unwrap();
            intersect(&z.shape, &Ray { origin: z.to_local(ray.origin), dir: z.dir_to_local(ray.dir) })
        };
        let (neck, chest) = (depth_of("neck").unwrap(), depth_of("chest").unwrap());
        assert!(chest + DEPTH_EPSILON < neck, "both are hit and the chest is in front");
        assert_eq!(hit_test(ndc, &view, cat.list_zones()).unwrap(), "chest");
        let mut reversed = cat.list_zones().to_vec();
        reversed.reverse();
        assert_eq!(hit_test(ndc, &view, &reversed).unwrap(), "chest");
    }

    #[test]
    fn primitive_intersections() {
        let down_z = |x: f32, y: f32| Ray { origin: [x, y, 5.0], dir: [0.0, 0.0, -1.0] };
        let t = intersect(&HitShape::Sphere { radius: 1.0 }, &down_z(0.0, 0.0)).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!(intersect(&HitShape::Sphere { radius: 1.0 }, &down_z(1.1, 0.0)).is_none());

        let bx = HitShape::Box { width: 0.2, height: 0.3, depth: 0.1 };
        assert!((intersect(&bx, &down_z(0.05, 0.1)).unwrap() - 4.95).abs() < 1e-5);
        assert!(intersect(&bx, &down_z(0.11, 0.0)).is_none());

        // Cone widens towards the top: a point just outside the bottom radius but inside the top one.
        let cyl = HitShape::Cylinder { radius_top: 0.6, radius_bottom: 0.3, height: 2.0 };
        assert!(intersect(&cyl, &down_z(0.4, 0.9)).is_some());
        assert!(intersect(&cyl, &down_z(0.4, -0.9)).is_none());
        assert!(intersect(&cyl, &down_z(0.0, 1.1)).is_none());
        // Looking straight down the axis lands on the top cap.
        let top = Ray { origin: [0.0, 5.0, 0.0], dir: [0.0, -1.0, 0.0] };
        assert!((intersect(&cyl, &top).unwrap() - 4.0).abs() < 1e-5);
    }
}
