/// Sequential K x K median filter over a row-major buffer.
///
/// Neighbour coordinates are clamped to the image edge. The window is sorted with
/// a stable total order and the element at `K*K / 2` is taken.
pub(crate) fn median_filter(input: &[f32], kernel_size: u32, width: u32, height: u32) -> Vec<f32> {
    assert_eq!(
        input.len(),
        width as usize * height as usize,
        "input length does not match {}x{}",
        width,
        height
    );
    assert!(kernel_size % 2 == 1, "kernel size must be odd");

    let radius = (kernel_size / 2) as i64;
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let stride = width as usize;

    let mut output = vec![0.0f32; input.len()];
    let mut window = Vec::with_capacity((kernel_size * kernel_size) as usize);

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            window.clear();

            for dy in -radius..=radius {
                let ny = (y + dy).clamp(0, max_y) as usize;
                let row = &input[ny * stride..(ny + 1) * stride];
                for dx in -radius..=radius {
                    let nx = (x + dx).clamp(0, max_x) as usize;
                    window.push(row[nx]);
                }
            }

            window.sort_by(f32::total_cmp);
            output[x as usize + stride * y as usize] = window[window.len() / 2];
        }
    }

    output
}
