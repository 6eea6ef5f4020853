pub type Contours = Vec<Vec<[f64; 2]>>;

pub fn square() -> Contours {
    vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]
}

pub fn star() -> Contours {
    vec![vec![
        [1.0, 0.0],
        [2.0, 2.0],
        [0.0, 1.0],
        [-2.0, 2.0],
        [-1.0, 0.0],
        [-2.0, -2.0],
        [0.0, -1.0],
        [2.0, -2.0],
    ]]
}

pub fn half_frame() -> Contours {
    vec![vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 1.0],
        [0.95, 0.95],
        [0.95, 0.05],
        [0.05, 0.05],
    ]]
}

/// A comb-like polygon with several merge and split vertices
pub fn comb() -> Contours {
    vec![vec![
        [0.0, 0.0],
        [7.0, 0.0],
        [7.0, 4.0],
        [6.0, 4.0],
        [6.0, 1.5],
        [5.0, 1.5],
        [5.0, 4.0],
        [4.0, 4.0],
        [4.0, 1.5],
        [3.0, 1.5],
        [3.0, 4.0],
        [2.0, 4.0],
        [2.0, 1.5],
        [1.0, 1.5],
        [1.0, 4.0],
        [0.0, 4.0],
    ]]
}

/// 4x4 square with a centered 2x2 hole (outer CCW, hole CW)
pub fn hollow_square() -> Contours {
    vec![
        vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        vec![[1.0, 1.0], [1.0, 3.0], [3.0, 3.0], [3.0, 1.0]],
    ]
}

/// Square with two separate square holes
pub fn double_hollow() -> Contours {
    vec![
        vec![[0.0, 0.0], [9.0, 0.0], [9.0, 5.0], [0.0, 5.0]],
        vec![[1.0, 1.0], [1.0, 4.0], [4.0, 4.0], [4.0, 1.0]],
        vec![[5.0, 1.0], [5.0, 4.0], [8.0, 4.0], [8.0, 1.0]],
    ]
}

pub fn regular_polygon(n: usize) -> Contours {
    let mut contour = Vec::with_capacity(n);
    for k in 0..n {
        let theta = std::f64::consts::PI * 2.0 * (k as f64) / (n as f64);
        let (y, x) = theta.sin_cos();
        contour.push([x * 100.0, y * 100.0]);
    }
    vec![contour]
}

pub fn all_simple() -> Vec<Contours> {
    vec![square(), star(), half_frame(), comb(), regular_polygon(12)]
}

pub fn all_hollow() -> Vec<Contours> {
    vec![hollow_square(), double_hollow()]
}
